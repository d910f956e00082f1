use chrono::{DateTime, Datelike, Days, Local, NaiveDate};
use itertools::Itertools;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::Path;

use crate::error::AppError;

pub const ROOKIE_SESSIONS: u32 = 10;
pub const STREAKER_DAYS: u32 = 7;
pub const SCHOLAR_MINUTES: u32 = 1000;

/// One study session whose proof was accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub subject: String,
    pub minutes: u32,
    pub tokens: u32,
    pub proof: String,
    pub completed_at: DateTime<Local>,
}

/// Snapshot the dashboard is rendered from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserStats {
    pub total_sessions: u32,
    pub total_minutes: u32,
    pub current_streak: u32,
    pub favorite_subject: Option<String>,
    pub jackpot_tokens: u32,
    pub weekly_goal: u32,
    pub completed_this_week: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Achievement {
    Rookie,
    Streaker,
    Scholar,
}

impl Achievement {
    pub const ALL: [Achievement; 3] = [
        Achievement::Rookie,
        Achievement::Streaker,
        Achievement::Scholar,
    ];

    pub fn is_unlocked(self, stats: &UserStats) -> bool {
        match self {
            Achievement::Rookie => stats.total_sessions >= ROOKIE_SESSIONS,
            Achievement::Streaker => stats.current_streak >= STREAKER_DAYS,
            Achievement::Scholar => stats.total_minutes >= SCHOLAR_MINUTES,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Achievement::Rookie => "🎯",
            Achievement::Streaker => "🔥",
            Achievement::Scholar => "⏰",
        }
    }
}

impl UserStats {
    /// Derive a snapshot from the full session history as seen on `today`.
    pub fn from_history(sessions: &[CompletedSession], weekly_goal: u32, today: NaiveDate) -> Self {
        let days: BTreeSet<NaiveDate> = sessions
            .iter()
            .map(|s| s.completed_at.date_naive())
            .collect();

        let week_start = today
            .checked_sub_days(Days::new(today.weekday().num_days_from_monday() as u64))
            .unwrap_or(today);

        let completed_this_week = sessions
            .iter()
            .filter(|s| {
                let day = s.completed_at.date_naive();
                day >= week_start && day <= today
            })
            .count();

        Self {
            total_sessions: sessions.len() as u32,
            total_minutes: sessions.iter().map(|s| s.minutes).sum(),
            current_streak: streak_ending(&days, today),
            favorite_subject: favorite_subject(sessions),
            jackpot_tokens: sessions.iter().map(|s| s.tokens).sum(),
            weekly_goal,
            completed_this_week: completed_this_week as u32,
        }
    }

    /// Percentage of the weekly goal reached. Not clamped; `None` without a goal.
    pub fn weekly_progress_pct(&self) -> Option<f64> {
        if self.weekly_goal == 0 {
            return None;
        }
        Some(100.0 * self.completed_this_week as f64 / self.weekly_goal as f64)
    }

    pub fn weekly_goal_met(&self) -> bool {
        self.weekly_progress_pct().is_some_and(|pct| pct >= 100.0)
    }

    pub fn sessions_to_go(&self) -> u32 {
        self.weekly_goal.saturating_sub(self.completed_this_week)
    }

    /// (hours, minutes)
    pub fn study_time(&self) -> (u32, u32) {
        (self.total_minutes / 60, self.total_minutes % 60)
    }

    pub fn is_week_champion(&self) -> bool {
        self.current_streak >= STREAKER_DAYS
    }

    pub fn achievements(&self) -> Vec<(Achievement, bool)> {
        Achievement::ALL
            .iter()
            .map(|a| (*a, a.is_unlocked(self)))
            .collect()
    }
}

fn streak_ending(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    // a streak is still alive if the last session was yesterday
    let mut cursor = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt().filter(|d| days.contains(d))
    };

    let mut streak = 0;
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

fn favorite_subject(sessions: &[CompletedSession]) -> Option<String> {
    sessions
        .iter()
        .map(|s| s.subject.as_str())
        .counts()
        .into_iter()
        .sorted_by(|(a_name, a_count), (b_name, b_count)| {
            b_count.cmp(a_count).then_with(|| a_name.cmp(b_name))
        })
        .map(|(name, _)| name.to_string())
        .next()
}

/// Plain-text rendition of the dashboard
pub struct Report<'a>(pub &'a UserStats);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;
        let (hours, minutes) = stats.study_time();

        writeln!(f, "Jackpot tokens: {}", stats.jackpot_tokens)?;
        write!(f, "Study streak:   {} days", stats.current_streak)?;
        if stats.is_week_champion() {
            write!(f, " (Week Champion!)")?;
        }
        writeln!(f)?;

        match stats.weekly_progress_pct() {
            Some(pct) => {
                write!(
                    f,
                    "Weekly goal:    {}/{} sessions ({:.0}%)",
                    stats.completed_this_week, stats.weekly_goal, pct
                )?;
                if stats.weekly_goal_met() {
                    writeln!(f, " goal completed!")?;
                } else {
                    writeln!(f, " {} to go", stats.sessions_to_go())?;
                }
            }
            None => writeln!(f, "Weekly goal:    not set")?,
        }

        writeln!(f, "Sessions:       {}", stats.total_sessions)?;
        writeln!(f, "Study time:     {}h {}m", hours, minutes)?;
        writeln!(
            f,
            "Favorite:       {}",
            stats.favorite_subject.as_deref().unwrap_or("none yet")
        )?;

        let badges = stats
            .achievements()
            .into_iter()
            .map(|(a, unlocked)| format!("{} {}", if unlocked { a.icon() } else { "🔒" }, a))
            .join("  ");
        write!(f, "Achievements:   {}", badges)
    }
}

/// Where completed sessions are kept
pub trait StatsStore {
    /// Append one accepted session
    fn record(&mut self, session: &CompletedSession) -> Result<(), AppError>;
    /// Oldest first
    fn history(&self) -> Result<Vec<CompletedSession>, AppError>;

    /// Dashboard numbers derived from the whole history as of `today`
    fn snapshot(&self, weekly_goal: u32, today: NaiveDate) -> Result<UserStats, AppError> {
        Ok(UserStats::from_history(&self.history()?, weekly_goal, today))
    }
}

/// Keeps the history for the lifetime of the process only
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    sessions: Vec<CompletedSession>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeded with sessions recorded elsewhere
    pub fn with_history(sessions: Vec<CompletedSession>) -> Self {
        Self { sessions }
    }
}

impl StatsStore for MemoryStatsStore {
    fn record(&mut self, session: &CompletedSession) -> Result<(), AppError> {
        self.sessions.push(session.clone());
        Ok(())
    }

    fn history(&self) -> Result<Vec<CompletedSession>, AppError> {
        Ok(self.sessions.clone())
    }
}

/// SQLite-backed session history
#[derive(Debug)]
pub struct SqliteStatsStore {
    conn: Connection,
}

impl SqliteStatsStore {
    /// Open (and create if needed) the database at `path`
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Throwaway database, gone when the store is dropped
    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, AppError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject TEXT NOT NULL,
                minutes INTEGER NOT NULL,
                tokens INTEGER NOT NULL,
                proof TEXT NOT NULL,
                completed_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at)",
            [],
        )?;

        Ok(Self { conn })
    }
}

impl StatsStore for SqliteStatsStore {
    /// Timestamps are stored as RFC 3339 text
    fn record(&mut self, session: &CompletedSession) -> Result<(), AppError> {
        self.conn.execute(
            r#"
            INSERT INTO sessions (subject, minutes, tokens, proof, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                session.subject,
                session.minutes,
                session.tokens,
                session.proof,
                session.completed_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn history(&self) -> Result<Vec<CompletedSession>, AppError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT subject, minutes, tokens, proof, completed_at
            FROM sessions
            ORDER BY completed_at ASC, id ASC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (subject, minutes, tokens, proof, completed_at) = row?;
            sessions.push(CompletedSession {
                subject,
                minutes,
                tokens,
                proof,
                completed_at: DateTime::parse_from_rfc3339(&completed_at)?.with_timezone(&Local),
            });
        }

        Ok(sessions)
    }
}

/// Column order of the CSV export, matching `CompletedSession`
pub const CSV_HEADER: [&str; 5] = ["subject", "minutes", "tokens", "proof", "completed_at"];

/// Write the history as CSV with a header row
pub fn export_csv<W: io::Write>(sessions: &[CompletedSession], out: W) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    // serialize only emits the header alongside the first record
    if sessions.is_empty() {
        writer.write_record(CSV_HEADER)?;
    }
    for session in sessions {
        writer.serialize(session)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn session(subject: &str, minutes: u32, when: DateTime<Local>) -> CompletedSession {
        CompletedSession {
            subject: subject.to_string(),
            minutes,
            tokens: 5,
            proof: "read two chapters and wrote a summary".to_string(),
            completed_at: when,
        }
    }

    // Wednesday
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
    }

    #[test]
    fn empty_history() {
        let stats = UserStats::from_history(&[], 5, today());
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.favorite_subject, None);
        assert_eq!(stats.weekly_goal, 5);
        assert_eq!(stats.weekly_progress_pct(), Some(0.0));
    }

    #[test]
    fn totals_tokens_and_favorite() {
        let history = vec![
            session("Science", 40, at(2026, 10, 1, 9)),
            session("Arts", 30, at(2026, 10, 2, 9)),
            session("Science", 90, at(2026, 10, 3, 9)),
        ];
        let stats = UserStats::from_history(&history, 5, today());
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.total_minutes, 160);
        assert_eq!(stats.jackpot_tokens, 15);
        assert_eq!(stats.favorite_subject.as_deref(), Some("Science"));
        assert_eq!(stats.study_time(), (2, 40));
    }

    #[test]
    fn favorite_ties_break_alphabetically() {
        let history = vec![
            session("History", 20, at(2026, 10, 1, 9)),
            session("Arts", 30, at(2026, 10, 2, 9)),
        ];
        let stats = UserStats::from_history(&history, 5, today());
        assert_eq!(stats.favorite_subject.as_deref(), Some("Arts"));
    }

    #[test]
    fn streak_counts_consecutive_days_ending_today() {
        let history = vec![
            session("Arts", 30, at(2026, 10, 17, 9)),
            session("Arts", 30, at(2026, 10, 19, 9)),
            session("Arts", 30, at(2026, 10, 20, 9)),
            session("Arts", 30, at(2026, 10, 21, 9)),
            session("Arts", 30, at(2026, 10, 21, 18)),
        ];
        let stats = UserStats::from_history(&history, 5, today());
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn streak_survives_until_today_is_over() {
        let history = vec![
            session("Arts", 30, at(2026, 10, 19, 9)),
            session("Arts", 30, at(2026, 10, 20, 9)),
        ];
        let stats = UserStats::from_history(&history, 5, today());
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn streak_breaks_after_a_missed_day() {
        let history = vec![session("Arts", 30, at(2026, 10, 19, 9))];
        let stats = UserStats::from_history(&history, 5, today());
        assert_eq!(stats.current_streak, 0);
    }

    #[test]
    fn weekly_count_starts_monday() {
        let history = vec![
            session("Arts", 30, at(2026, 10, 18, 23)), // Sunday before
            session("Arts", 30, at(2026, 10, 19, 1)),  // Monday
            session("Arts", 30, at(2026, 10, 21, 9)),
        ];
        let stats = UserStats::from_history(&history, 4, today());
        assert_eq!(stats.completed_this_week, 2);
        assert_eq!(stats.weekly_progress_pct(), Some(50.0));
        assert_eq!(stats.sessions_to_go(), 2);
        assert!(!stats.weekly_goal_met());
    }

    #[test]
    fn weekly_progress_is_not_clamped() {
        let stats = UserStats {
            weekly_goal: 2,
            completed_this_week: 3,
            ..Default::default()
        };
        assert_eq!(stats.weekly_progress_pct(), Some(150.0));
        assert!(stats.weekly_goal_met());
        assert_eq!(stats.sessions_to_go(), 0);
    }

    #[test]
    fn zero_goal_has_no_progress() {
        let stats = UserStats {
            weekly_goal: 0,
            completed_this_week: 3,
            ..Default::default()
        };
        assert_eq!(stats.weekly_progress_pct(), None);
        assert!(!stats.weekly_goal_met());
    }

    #[test]
    fn achievement_thresholds() {
        let rookie = UserStats {
            total_sessions: 10,
            ..Default::default()
        };
        assert!(Achievement::Rookie.is_unlocked(&rookie));

        let almost = UserStats {
            total_sessions: 9,
            ..Default::default()
        };
        assert!(!Achievement::Rookie.is_unlocked(&almost));

        let streaker = UserStats {
            current_streak: 7,
            ..Default::default()
        };
        assert!(Achievement::Streaker.is_unlocked(&streaker));
        assert!(streaker.is_week_champion());

        let not_scholar = UserStats {
            total_minutes: 999,
            ..Default::default()
        };
        assert!(!Achievement::Scholar.is_unlocked(&not_scholar));
        assert!(Achievement::Scholar.is_unlocked(&UserStats {
            total_minutes: 1000,
            ..Default::default()
        }));
    }

    #[test]
    fn achievements_are_independent() {
        let stats = UserStats {
            total_sessions: 12,
            current_streak: 1,
            total_minutes: 1200,
            ..Default::default()
        };
        assert_eq!(
            stats.achievements(),
            vec![
                (Achievement::Rookie, true),
                (Achievement::Streaker, false),
                (Achievement::Scholar, true),
            ]
        );
    }

    #[test]
    fn report_mentions_the_numbers() {
        let stats = UserStats {
            total_sessions: 4,
            total_minutes: 135,
            current_streak: 8,
            favorite_subject: Some("History".into()),
            jackpot_tokens: 20,
            weekly_goal: 5,
            completed_this_week: 2,
        };
        let text = Report(&stats).to_string();
        assert!(text.contains("Jackpot tokens: 20"));
        assert!(text.contains("Week Champion"));
        assert!(text.contains("2/5 sessions (40%) 3 to go"));
        assert!(text.contains("2h 15m"));
        assert!(text.contains("History"));
        assert!(text.contains("🔒 Rookie"));
        assert!(text.contains("🔥 Streaker"));
    }

    #[test]
    fn memory_store_records() {
        let mut store = MemoryStatsStore::new();
        store.record(&session("Arts", 30, at(2026, 10, 21, 9))).unwrap();
        let stats = store.snapshot(3, today()).unwrap();
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn sqlite_store_roundtrip() {
        let mut store = SqliteStatsStore::open_in_memory().unwrap();
        let first = session("Science", 40, at(2026, 10, 20, 9));
        let second = session("English", 25, at(2026, 10, 21, 9));
        store.record(&second).unwrap();
        store.record(&first).unwrap();

        let history = store.history().unwrap();
        assert_eq!(history, vec![first, second]);
    }

    #[test]
    fn export_writes_header_and_rows() {
        let history = vec![session("Arts", 30, at(2026, 10, 21, 9))];
        let mut out = Vec::new();
        export_csv(&history, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("subject,minutes,tokens,proof,completed_at"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("Arts,30,5,read two chapters and wrote a summary,2026-10-21T09:00:00"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn export_of_empty_history_still_has_header() {
        let mut out = Vec::new();
        export_csv(&[], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "subject,minutes,tokens,proof,completed_at\n");
    }

    #[test]
    fn memory_store_starts_from_given_history() {
        let mut store = MemoryStatsStore::with_history(vec![
            session("History", 50, at(2026, 10, 19, 9)),
            session("History", 30, at(2026, 10, 20, 9)),
        ]);
        store.record(&session("Arts", 30, at(2026, 10, 21, 9))).unwrap();

        let stats = store.snapshot(3, today()).unwrap();
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.favorite_subject.as_deref(), Some("History"));
        assert_eq!(store.history().unwrap()[2].subject, "Arts");
    }
}
