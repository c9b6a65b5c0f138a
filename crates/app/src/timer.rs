//! Timer bookkeeping for the runner.
//!
//! The runner never sleeps itself. It records which timer should be running
//! and for how long; the task driving it turns that into a real deadline and
//! reports back with the token when it expires. Every arm gets a fresh
//! token, so an expiry that raced with a re-arm or a cancel is recognised as
//! stale and dropped.

use std::time::Duration;

/// What the runner is waiting for when a timer is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// The target's settings screen (and its "Force stop" button) to show up.
    Navigation,
    /// The confirmation dialog to finish rendering after "Force stop".
    Settle,
    /// The confirmation dialog to be reported once the settle delay is over.
    Confirmation,
}

impl TimerKind {
    /// Whether expiry of this timer counts against the retry budget.
    #[must_use]
    pub fn is_deadline(self) -> bool {
        !matches!(self, Self::Settle)
    }
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Navigation => f.write_str("navigation"),
            Self::Settle => f.write_str("settle"),
            Self::Confirmation => f.write_str("confirmation"),
        }
    }
}

/// Identifies one arming of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// The timer currently armed by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub token: TimerToken,
    pub kind: TimerKind,
    pub duration: Duration,
}

/// Single-slot timer: arming replaces whatever was armed before.
#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
    next_token: u64,
    armed: Option<ArmedTimer>,
}

impl TimerSlot {
    /// Arm a timer, cancelling the previous one.
    pub(crate) fn arm(&mut self, kind: TimerKind, duration: Duration) -> ArmedTimer {
        self.next_token += 1;
        let timer = ArmedTimer {
            token: TimerToken(self.next_token),
            kind,
            duration,
        };
        self.armed = Some(timer);
        timer
    }

    /// Cancel the armed timer, if any.
    pub(crate) fn disarm(&mut self) {
        self.armed = None;
    }

    /// Consume an expiry. Returns `None` when `token` is not the armed timer.
    pub(crate) fn fire(&mut self, token: TimerToken) -> Option<TimerKind> {
        match self.armed {
            Some(timer) if timer.token == token => {
                self.armed = None;
                Some(timer.kind)
            }
            _ => None,
        }
    }

    pub(crate) fn armed(&self) -> Option<ArmedTimer> {
        self.armed
    }
}
