use std::sync::mpsc::Sender;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::RngCore;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::countdown::{Countdown, Phase, Tick};
use crate::error::AppError;
use crate::runtime::{AppEvent, SessionId};
use crate::selector::{Selector, SpinResult};
use crate::session::StudySession;
use crate::stats::{CompletedSession, StatsStore, UserStats};

pub const TICK_RATE_MS: u64 = 100;

/// Runtime knobs derived from the config
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub weekly_goal: u32,
    pub tokens_per_session: u32,
    /// UI ticks the wheel spins for
    pub spin_ticks: u32,
    /// UI ticks the result is shown before the session opens
    pub reveal_ticks: u32,
    /// Real time per countdown second
    pub second: Duration,
}

impl Settings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            weekly_goal: cfg.weekly_goal,
            tokens_per_session: cfg.tokens_per_session,
            spin_ticks: ticks_for(cfg.spin_millis),
            reveal_ticks: ticks_for(cfg.reveal_millis),
            second: Duration::from_secs(1),
        }
    }
}

/// Whole UI ticks in `millis`, saturating at `u32::MAX`
fn ticks_for(millis: u64) -> u32 {
    u32::try_from(millis / TICK_RATE_MS).unwrap_or(u32::MAX)
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouletteState {
    Ready,
    Spinning { ticks_left: u32, highlight: usize },
    Revealed { result: SpinResult, ticks_left: u32 },
}

/// Shown on the dashboard right after a proof is accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReward {
    pub subject: String,
    pub minutes: u32,
    pub tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub stats: UserStats,
    pub reward: Option<SessionReward>,
    pub warning: Option<String>,
}

#[derive(Debug, strum_macros::Display)]
pub enum View {
    Welcome,
    Roulette(RouletteState),
    Session(Box<StudySession>),
    Dashboard(Dashboard),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Everything a key press can ask the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Play,
    Spin,
    SkipReveal,
    ToWelcome,
    StartSession,
    AbandonSession,
    BackToWheel,
    TypeChar(char),
    Backspace,
    SubmitProof,
    SpinAgain,
}

pub struct App {
    view: View,
    settings: Settings,
    selector: Selector,
    store: Box<dyn StatsStore>,
    rng: Box<dyn RngCore>,
    events: Sender<AppEvent>,
    next_session: u64,
}

impl App {
    pub fn new(
        settings: Settings,
        store: Box<dyn StatsStore>,
        rng: Box<dyn RngCore>,
        events: Sender<AppEvent>,
    ) -> Self {
        Self {
            view: View::Welcome,
            settings,
            selector: Selector::new(Catalog::standard()),
            store,
            rng,
            events,
            next_session: 1,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn session(&self) -> Option<&StudySession> {
        match &self.view {
            View::Session(session) => Some(session),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: AppEvent) -> Control {
        match event {
            AppEvent::Key(key) => match self.action_for(key) {
                Some(action) => self.apply(action),
                None => Control::Continue,
            },
            AppEvent::Tick => {
                self.on_tick();
                Control::Continue
            }
            AppEvent::SessionTick(id) => {
                self.on_session_tick(id);
                Control::Continue
            }
            AppEvent::Resize => Control::Continue,
        }
    }

    pub fn action_for(&self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        match &self.view {
            View::Welcome => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Play),
                KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            },
            View::Roulette(state) => match (state, key.code) {
                (RouletteState::Ready, KeyCode::Enter | KeyCode::Char(' ')) => Some(Action::Spin),
                (RouletteState::Ready, KeyCode::Char('q')) => Some(Action::Quit),
                (RouletteState::Revealed { .. }, KeyCode::Enter | KeyCode::Char(' ')) => {
                    Some(Action::SkipReveal)
                }
                (_, KeyCode::Esc | KeyCode::Char('b')) => Some(Action::ToWelcome),
                _ => None,
            },
            View::Session(session) => match (session.phase(), key.code) {
                (Phase::Idle, KeyCode::Enter | KeyCode::Char('s')) => Some(Action::StartSession),
                (Phase::Idle, KeyCode::Esc | KeyCode::Char('b')) => Some(Action::BackToWheel),
                (Phase::Running, KeyCode::Char('x')) => Some(Action::AbandonSession),
                (Phase::Running, KeyCode::Esc) => Some(Action::BackToWheel),
                (Phase::Expired, KeyCode::Enter) => Some(Action::SubmitProof),
                (Phase::Expired, KeyCode::Backspace) => Some(Action::Backspace),
                (Phase::Expired, KeyCode::Esc) => Some(Action::BackToWheel),
                (Phase::Expired, KeyCode::Char(c)) => Some(Action::TypeChar(c)),
                _ => None,
            },
            View::Dashboard(_) => match key.code {
                KeyCode::Enter | KeyCode::Char('s') => Some(Action::SpinAgain),
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('b') => Some(Action::ToWelcome),
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            },
        }
    }

    pub fn apply(&mut self, action: Action) -> Control {
        match action {
            Action::Quit => {
                self.set_view(View::Welcome);
                return Control::Quit;
            }
            Action::Play | Action::SpinAgain => {
                if matches!(self.view, View::Welcome | View::Dashboard(_)) {
                    self.set_view(View::Roulette(RouletteState::Ready));
                }
            }
            Action::Spin => self.spin(),
            Action::SkipReveal => {
                if let View::Roulette(RouletteState::Revealed { result, .. }) = &self.view {
                    let result = result.clone();
                    self.open_session(result);
                }
            }
            Action::ToWelcome => {
                if matches!(self.view, View::Roulette(_) | View::Dashboard(_)) {
                    self.set_view(View::Welcome);
                }
            }
            Action::StartSession => self.start_session(),
            Action::AbandonSession => {
                if let View::Session(session) = &mut self.view {
                    if session.phase() == Phase::Running {
                        tracing::info!(
                            session = session.id().0,
                            elapsed = session.countdown().elapsed_secs(),
                            "session abandoned"
                        );
                        session.abandon();
                    }
                }
            }
            Action::BackToWheel => {
                if let View::Session(session) = &self.view {
                    tracing::info!(session = session.id().0, phase = %session.phase(), "left session");
                    self.set_view(View::Roulette(RouletteState::Ready));
                }
            }
            Action::TypeChar(c) => {
                if let View::Session(session) = &mut self.view {
                    session.type_char(c);
                }
            }
            Action::Backspace => {
                if let View::Session(session) = &mut self.view {
                    session.backspace();
                }
            }
            Action::SubmitProof => self.submit_proof(),
        }
        Control::Continue
    }

    fn set_view(&mut self, next: View) {
        // the session clock must be stopped before the view changes
        if let View::Session(session) = &mut self.view {
            session.stop_clock();
        }
        tracing::debug!(from = %self.view, to = %next, "view change");
        self.view = next;
    }

    fn spin(&mut self) {
        if let View::Roulette(RouletteState::Ready) = self.view {
            let highlight = (self.rng.next_u32() as usize) % self.selector.catalog().len();
            self.view = View::Roulette(RouletteState::Spinning {
                ticks_left: self.settings.spin_ticks,
                highlight,
            });
        }
    }

    fn on_tick(&mut self) {
        let catalog_len = self.selector.catalog().len();
        let View::Roulette(state) = &mut self.view else {
            return;
        };

        let open = match state {
            RouletteState::Ready => None,
            RouletteState::Spinning {
                ticks_left,
                highlight,
            } => {
                if *ticks_left > 0 {
                    *ticks_left -= 1;
                    *highlight = (*highlight + 1) % catalog_len;
                }
                if *ticks_left == 0 {
                    let result = self.selector.spin(self.rng.as_mut());
                    tracing::info!(subject = %result.subject, minutes = result.minutes, "wheel stopped");
                    *state = RouletteState::Revealed {
                        result,
                        ticks_left: self.settings.reveal_ticks,
                    };
                }
                None
            }
            RouletteState::Revealed { result, ticks_left } => {
                *ticks_left = ticks_left.saturating_sub(1);
                (*ticks_left == 0).then(|| result.clone())
            }
        };

        if let Some(result) = open {
            self.open_session(result);
        }
    }

    fn open_session(&mut self, result: SpinResult) {
        let countdown = match Countdown::from_minutes(result.minutes) {
            Ok(countdown) => countdown,
            Err(err) => {
                tracing::error!(%err, subject = %result.subject, "cannot open session");
                self.set_view(View::Roulette(RouletteState::Ready));
                return;
            }
        };

        let id = SessionId(self.next_session);
        self.next_session += 1;
        tracing::info!(session = id.0, subject = %result.subject, minutes = result.minutes, "session opened");
        self.set_view(View::Session(Box::new(StudySession::new(id, result, countdown))));
    }

    fn start_session(&mut self) {
        let second = self.settings.second;
        if let View::Session(session) = &mut self.view {
            if session.start(self.events.clone(), second) {
                tracing::info!(session = session.id().0, "session started");
            }
        }
    }

    fn on_session_tick(&mut self, id: SessionId) {
        let View::Session(session) = &mut self.view else {
            tracing::debug!(session = id.0, "stale session tick");
            return;
        };

        match session.on_clock_tick(id) {
            Tick::Expired => tracing::info!(session = id.0, "time's up, proof required"),
            Tick::Ignored => tracing::debug!(session = id.0, "stale session tick"),
            Tick::Counted { .. } => {}
        }
    }

    fn submit_proof(&mut self) {
        let View::Session(session) = &mut self.view else {
            return;
        };
        if !session.countdown().proof_required() {
            return;
        }

        let proof = match session.submit() {
            Ok(proof) => proof,
            Err(err) => {
                tracing::debug!(%err, "proof rejected");
                return;
            }
        };

        let spin = session.spin().clone();
        let completed = CompletedSession {
            subject: spin.subject.clone(),
            minutes: spin.minutes,
            tokens: self.settings.tokens_per_session,
            proof: proof.into_text(),
            completed_at: Local::now(),
        };

        let mut warning = None;
        if let Err(err) = self.store.record(&completed) {
            tracing::error!(%err, "failed to record session");
            warning = Some(format!("could not save this session: {err}"));
        }
        tracing::info!(subject = %completed.subject, minutes = completed.minutes, tokens = completed.tokens, "session completed");

        let stats = match self.load_stats() {
            Ok(stats) => stats,
            Err(err) => {
                warning.get_or_insert_with(|| format!("could not load stats: {err}"));
                UserStats {
                    weekly_goal: self.settings.weekly_goal,
                    ..Default::default()
                }
            }
        };

        self.set_view(View::Dashboard(Dashboard {
            stats,
            reward: Some(SessionReward {
                subject: spin.subject,
                minutes: spin.minutes,
                tokens: completed.tokens,
            }),
            warning,
        }));
    }

    /// Fresh snapshot from the store for today
    pub fn load_stats(&self) -> Result<UserStats, AppError> {
        self.store
            .snapshot(self.settings.weekly_goal, Local::now().date_naive())
            .inspect_err(|err| tracing::error!(%err, "failed to load stats"))
    }
}
