use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Identifies the study session a clock was started for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// UI heartbeat; drives animations
    Tick,
    /// One second of study elapsed for the given session
    SessionTick(SessionId),
}

/// Source of application events
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Events delivered over a channel: terminal input, session clocks, or a test driver
pub struct ChannelEventSource {
    rx: Receiver<AppEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Forward crossterm key and resize events into `tx` from a background thread
pub fn spawn_terminal_reader(tx: Sender<AppEvent>) {
    thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(CtEvent::Key(key)) => AppEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
            Ok(_) => continue,
            Err(err) => {
                tracing::error!(%err, "terminal event reader stopped");
                break;
            }
        };
        if tx.send(evt).is_err() {
            break;
        }
    });
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}

/// Repeating one-second (or `period`) timer bound to a single session.
///
/// Sends `AppEvent::SessionTick(id)` until dropped. Dropping cancels the
/// thread and waits for it, so no tick is sent after `drop` returns.
#[derive(Debug)]
pub struct SessionClock {
    id: SessionId,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SessionClock {
    pub fn start(id: SessionId, period: Duration, tx: Sender<AppEvent>) -> Self {
        let (cancel, cancelled) = mpsc::channel::<()>();

        let handle = thread::spawn(move || loop {
            match cancelled.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => {
                    if tx.send(AppEvent::SessionTick(id)).is_err() {
                        break;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        tracing::debug!(session = id.0, ?period, "session clock started");
        Self {
            id,
            cancel: Some(cancel),
            handle: Some(handle),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        // closing the channel wakes the thread immediately
        self.cancel.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        tracing::debug!(session = self.id.0, "session clock stopped");
    }
}
