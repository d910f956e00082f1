use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use super::{bold, gold_bold, hint};
use crate::{
    app::{Dashboard, Settings},
    stats::UserStats,
};

pub fn render(dashboard: &Dashboard, settings: &Settings, area: Rect, buf: &mut Buffer) {
    let stats = &dashboard.stats;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // reward banner / warning
            Constraint::Length(6), // tokens, streak, weekly goal
            Constraint::Length(6), // totals, achievements
            Constraint::Min(0),
            Constraint::Length(1), // keys
        ])
        .split(area);

    banner(dashboard).render(rows[0], buf);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[1]);

    Paragraph::new(vec![
        Line::from(Span::styled(stats.jackpot_tokens.to_string(), gold_bold())),
        Line::from("Tokens earned"),
        Line::from(Span::styled(
            format!("+{} per session", settings.tokens_per_session),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
    ])
    .block(card("🎰 JACKPOT TOKENS", Color::Yellow))
    .alignment(Alignment::Center)
    .render(top[0], buf);

    let mut streak = vec![
        Line::from(Span::styled(
            stats.current_streak.to_string(),
            bold().fg(Color::Magenta),
        )),
        Line::from("Days in a row"),
    ];
    if stats.is_week_champion() {
        streak.push(Line::from(Span::styled(
            "🏆 Week Champion!",
            Style::default().fg(Color::White).bg(Color::Magenta),
        )));
    }
    Paragraph::new(streak)
        .block(card("🔥 STUDY STREAK", Color::Magenta))
        .alignment(Alignment::Center)
        .render(top[1], buf);

    weekly_goal(stats, top[2], buf);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(rows[2]);

    let (hours, minutes) = stats.study_time();
    Paragraph::new(vec![
        Line::from(format!("Sessions:   {}", stats.total_sessions)),
        Line::from(format!("Study time: {hours}h {minutes}m")),
        Line::from(vec![
            Span::raw("Favorite:   "),
            Span::styled(
                stats
                    .favorite_subject
                    .clone()
                    .unwrap_or_else(|| "none yet".to_string()),
                gold_bold(),
            ),
        ]),
    ])
    .block(card("📈 Total Stats", Color::Green))
    .render(bottom[0], buf);

    let badges = stats
        .achievements()
        .into_iter()
        .map(|(achievement, unlocked)| {
            let icon = if unlocked { achievement.icon() } else { "🔒" };
            format!("{icon} {achievement}")
        })
        .join("   ");
    Paragraph::new(vec![
        Line::from(Span::styled(badges, bold())),
        Line::default(),
        Line::from(Span::styled("Keep studying to unlock more!", hint())),
    ])
    .block(card("🏅 Achievements", Color::LightBlue))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(bottom[1], buf);

    Paragraph::new(Span::styled(
        "(enter) spin again  (h) home  (q) quit",
        hint(),
    ))
    .alignment(Alignment::Center)
    .render(rows[4], buf);
}

fn card(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(title, bold().fg(color)))
}

fn banner(dashboard: &Dashboard) -> Paragraph<'static> {
    let mut lines = Vec::new();
    if let Some(reward) = &dashboard.reward {
        lines.push(Line::from(Span::styled(
            format!(
                "💰 {} minutes of {} done! +{} tokens",
                reward.minutes, reward.subject, reward.tokens
            ),
            gold_bold(),
        )));
    }
    if let Some(warning) = &dashboard.warning {
        lines.push(Line::from(Span::styled(
            warning.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }
    Paragraph::new(lines).alignment(Alignment::Center)
}

fn weekly_goal(stats: &UserStats, area: Rect, buf: &mut Buffer) {
    let block = card("📊 Weekly Goal", Color::LightMagenta);
    let inner = block.inner(area);
    block.render(area, buf);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let Some(pct) = stats.weekly_progress_pct() else {
        Paragraph::new("No weekly goal set")
            .alignment(Alignment::Center)
            .render(parts[0], buf);
        return;
    };

    Paragraph::new(format!(
        "{}/{} sessions",
        stats.completed_this_week, stats.weekly_goal
    ))
    .alignment(Alignment::Center)
    .render(parts[0], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(Color::LightMagenta))
        .ratio((pct / 100.0).clamp(0.0, 1.0))
        .label(format!("{pct:.0}%"))
        .render(parts[1], buf);

    let caption = if stats.weekly_goal_met() {
        "🎉 Goal completed!".to_string()
    } else {
        format!("{} sessions to go", stats.sessions_to_go())
    };
    Paragraph::new(Span::styled(caption, hint()))
        .alignment(Alignment::Center)
        .render(parts[2], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SessionReward;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(dashboard: &Dashboard) -> String {
        let backend = TestBackend::new(120, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let settings = Settings::default();
        terminal
            .draw(|f| render(dashboard, &settings, f.area(), f.buffer_mut()))
            .unwrap();
        crate::ui::test_support::text(terminal.backend().buffer())
    }

    fn stats() -> UserStats {
        UserStats {
            total_sessions: 12,
            total_minutes: 605,
            current_streak: 3,
            favorite_subject: Some("Science".into()),
            jackpot_tokens: 60,
            weekly_goal: 5,
            completed_this_week: 2,
        }
    }

    #[test]
    fn shows_totals_and_reward() {
        let content = draw(&Dashboard {
            stats: stats(),
            reward: Some(SessionReward {
                subject: "Science".into(),
                minutes: 40,
                tokens: 5,
            }),
            warning: None,
        });
        assert!(content.contains("40 minutes of Science done! +5 tokens"));
        assert!(content.contains("Study time: 10h 5m"));
        assert!(content.contains("2/5 sessions"));
        assert!(content.contains("3 sessions to go"));
        assert!(content.contains("Rookie"));
    }

    #[test]
    fn goal_beyond_hundred_percent_renders() {
        let content = draw(&Dashboard {
            stats: UserStats {
                completed_this_week: 8,
                ..stats()
            },
            reward: None,
            warning: Some("could not save this session: disk full".into()),
        });
        assert!(content.contains("160%"));
        assert!(content.contains("Goal completed!"));
        assert!(content.contains("could not save this session"));
    }

    #[test]
    fn zero_goal_renders_without_progress() {
        let content = draw(&Dashboard {
            stats: UserStats {
                weekly_goal: 0,
                ..stats()
            },
            reward: None,
            warning: None,
        });
        assert!(content.contains("No weekly goal set"));
    }
}
