use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CountdownError {
    #[error("a study session needs a positive duration")]
    ZeroDuration,

    #[error("{minutes} minutes does not fit in a countdown")]
    TooLong { minutes: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Running,
    Expired,
}

/// What a single tick did to the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not running; nothing changed.
    Ignored,
    Counted { remaining: u32 },
    /// Reached zero on this tick. Reported once per countdown.
    Expired,
}

/// Whole-second countdown for one study session.
///
/// `Idle -> Running -> Expired`. Abandoning consumes the countdown and hands
/// back a fresh idle one at the full duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    total_secs: u32,
    remaining_secs: u32,
    phase: Phase,
}

impl Countdown {
    /// An idle countdown of `total_secs`; zero is rejected
    pub fn new(total_secs: u32) -> Result<Self, CountdownError> {
        if total_secs == 0 {
            return Err(CountdownError::ZeroDuration);
        }
        Ok(Self {
            total_secs,
            remaining_secs: total_secs,
            phase: Phase::Idle,
        })
    }

    /// Same as `new` but in whole minutes
    pub fn from_minutes(minutes: u32) -> Result<Self, CountdownError> {
        let secs = minutes
            .checked_mul(60)
            .ok_or(CountdownError::TooLong { minutes })?;
        Self::new(secs)
    }

    /// Returns true if the countdown moved from idle to running.
    pub fn start(&mut self) -> bool {
        if self.phase == Phase::Idle {
            self.phase = Phase::Running;
            true
        } else {
            false
        }
    }

    /// Count down one second. Only a running countdown moves, and it
    /// reports `Tick::Expired` exactly once when it reaches zero.
    pub fn tick(&mut self) -> Tick {
        if self.phase != Phase::Running {
            return Tick::Ignored;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.phase = Phase::Expired;
            Tick::Expired
        } else {
            Tick::Counted {
                remaining: self.remaining_secs,
            }
        }
    }

    /// Throw away progress and return an idle countdown of the same length
    pub fn abandon(self) -> Countdown {
        Countdown {
            total_secs: self.total_secs,
            remaining_secs: self.total_secs,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// The countdown ran out and the notes screen is due
    pub fn proof_required(&self) -> bool {
        self.phase == Phase::Expired
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.total_secs - self.remaining_secs
    }

    /// Fraction of the session already studied, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.elapsed_secs() as f64 / self.total_secs as f64
    }

    /// At least half of the session has elapsed
    pub fn past_halfway(&self) -> bool {
        self.elapsed_secs() * 2 >= self.total_secs
    }
}

/// `MM:SS`; minutes are not wrapped into hours
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
