use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::countdown::{Countdown, Phase, Tick};
use crate::proof::{self, ProofError, ProofOfStudy};
use crate::runtime::{AppEvent, SessionClock, SessionId};
use crate::selector::SpinResult;

const REMINDERS: [&str; 4] = [
    "Halfway there. Keep the phone face down.",
    "Halfway! Jot down one thing you just learned.",
    "Past the halfway mark. The jackpot is getting closer.",
    "Halfway done. Stretch, breathe, keep going.",
];

/// A study session bound to one spin result.
///
/// Owns the clock driving its countdown; the clock is stopped whenever the
/// countdown leaves the running phase and when the session is dropped.
#[derive(Debug)]
pub struct StudySession {
    id: SessionId,
    spin: SpinResult,
    countdown: Countdown,
    clock: Option<SessionClock>,
    proof: String,
    proof_error: Option<ProofError>,
    reminder: Option<&'static str>,
}

impl StudySession {
    /// A session waiting to be started, with no clock yet
    pub fn new(id: SessionId, spin: SpinResult, countdown: Countdown) -> Self {
        Self {
            id,
            spin,
            countdown,
            clock: None,
            proof: String::new(),
            proof_error: None,
            reminder: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn spin(&self) -> &SpinResult {
        &self.spin
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn phase(&self) -> Phase {
        self.countdown.phase()
    }

    pub fn proof_text(&self) -> &str {
        &self.proof
    }

    pub fn proof_error(&self) -> Option<&ProofError> {
        self.proof_error.as_ref()
    }

    /// Encouragement shown once the countdown is past halfway
    pub fn reminder(&self) -> Option<&'static str> {
        self.reminder
    }

    pub fn has_clock(&self) -> bool {
        self.clock.is_some()
    }

    /// Start counting down, ticking every `period` into `tx`
    pub fn start(&mut self, tx: Sender<AppEvent>, period: Duration) -> bool {
        if !self.countdown.start() {
            return false;
        }
        self.clock = Some(SessionClock::start(self.id, period, tx));
        true
    }

    /// Give up the running countdown; the session goes back to idle at full length
    pub fn abandon(&mut self) {
        self.stop_clock();
        let countdown = self.countdown.clone();
        self.countdown = countdown.abandon();
        self.reminder = None;
    }

    /// Drop the clock thread, if any. Dropping joins it.
    pub fn stop_clock(&mut self) {
        self.clock.take();
    }

    /// Apply a clock tick. Ticks for another session are stale and ignored.
    pub fn on_clock_tick(&mut self, id: SessionId) -> Tick {
        if id != self.id {
            return Tick::Ignored;
        }

        let tick = self.countdown.tick();
        match tick {
            Tick::Counted { .. } => {
                if self.reminder.is_none() && self.countdown.past_halfway() {
                    self.reminder = Some(REMINDERS[(self.id.0 as usize) % REMINDERS.len()]);
                }
            }
            Tick::Expired => self.stop_clock(),
            Tick::Ignored => {}
        }
        tick
    }

    /// Append to the notes. Input before expiry is discarded.
    pub fn type_char(&mut self, c: char) {
        if self.countdown.proof_required() {
            self.proof.push(c);
            self.proof_error = None;
        }
    }

    pub fn backspace(&mut self) {
        if self.countdown.proof_required() {
            self.proof.pop();
            self.proof_error = None;
        }
    }

    /// Characters that count towards the minimum
    pub fn proof_chars(&self) -> usize {
        proof::trimmed_len(&self.proof)
    }

    /// Validate the typed notes. A rejection is kept for display.
    pub fn submit(&mut self) -> Result<ProofOfStudy, ProofError> {
        proof::validate(&self.proof).inspect_err(|err| {
            self.proof_error = Some(err.clone());
        })
    }
}
