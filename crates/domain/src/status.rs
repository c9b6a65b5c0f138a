//! Run status: a read-only snapshot of the runner for progress displays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::RunId;
use crate::run::{RunState, TargetOutcome};
use crate::target::Target;

/// UTC timestamp used for run start/finish times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Outcome recorded for one dequeued target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReport {
    pub target: Target,
    pub outcome: TargetOutcome,
}

/// Snapshot of the runner after the last processed trigger.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunStatus {
    pub run_id: Option<RunId>,
    pub state: RunState,
    pub total: usize,
    pub remaining: usize,
    pub reports: Vec<TargetReport>,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
}

impl RunStatus {
    /// Targets taken off the queue so far (or dropped by an abort).
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.total.saturating_sub(self.remaining)
    }

    /// Targets whose confirmation dialog was accepted.
    #[must_use]
    pub fn stopped(&self) -> usize {
        self.count(TargetOutcome::Stopped)
    }

    /// Targets abandoned after the retry budget ran out.
    #[must_use]
    pub fn gave_up(&self) -> usize {
        self.count(TargetOutcome::GaveUp)
    }

    fn count(&self, outcome: TargetOutcome) -> usize {
        self.reports.iter().filter(|r| r.outcome == outcome).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetId;

    fn report(id: &str, outcome: TargetOutcome) -> TargetReport {
        TargetReport {
            target: Target::unlabelled(TargetId::new(id).unwrap()),
            outcome,
        }
    }

    #[test]
    fn should_start_empty() {
        let status = RunStatus::default();
        assert_eq!(status.state, RunState::Idle);
        assert_eq!(status.consumed(), 0);
        assert!(status.run_id.is_none());
    }

    #[test]
    fn should_derive_consumed_from_total_and_remaining() {
        let status = RunStatus {
            total: 5,
            remaining: 2,
            ..RunStatus::default()
        };
        assert_eq!(status.consumed(), 3);
    }

    #[test]
    fn should_tally_outcomes() {
        let status = RunStatus {
            reports: vec![
                report("a", TargetOutcome::Stopped),
                report("b", TargetOutcome::GaveUp),
                report("c", TargetOutcome::Stopped),
            ],
            ..RunStatus::default()
        };
        assert_eq!(status.stopped(), 2);
        assert_eq!(status.gave_up(), 1);
    }

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        assert!(ts >= before);
    }
}
