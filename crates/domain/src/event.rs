//! Run events: notifications emitted by the runner for progress observers.

use serde::{Deserialize, Serialize};

use crate::id::RunId;
use crate::target::TargetId;

/// Emitted once per dequeued target, immediately before navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub run_id: RunId,
    pub target: TargetId,
    pub label: String,
    /// 1-based position of the target in the run.
    pub current: usize,
    pub total: usize,
}

/// Emitted exactly once per run, as its last event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishEvent {
    pub run_id: RunId,
    pub aborted: bool,
}

/// Any event a run publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    Progress(ProgressEvent),
    Finished(FinishEvent),
}

impl RunEvent {
    /// Run that produced this event.
    #[must_use]
    pub fn run_id(&self) -> RunId {
        match self {
            Self::Progress(e) => e.run_id,
            Self::Finished(e) => e.run_id,
        }
    }

    /// Whether this is the terminal event of its run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

impl From<ProgressEvent> for RunEvent {
    fn from(event: ProgressEvent) -> Self {
        Self::Progress(event)
    }
}

impl From<FinishEvent> for RunEvent {
    fn from(event: FinishEvent) -> Self {
        Self::Finished(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_mark_only_finish_as_terminal() {
        let run_id = RunId::new();
        let progress = RunEvent::from(ProgressEvent {
            run_id,
            target: TargetId::new("com.example.mail").unwrap(),
            label: "Mail".to_string(),
            current: 1,
            total: 2,
        });
        let finish = RunEvent::from(FinishEvent {
            run_id,
            aborted: false,
        });
        assert!(!progress.is_terminal());
        assert!(finish.is_terminal());
        assert_eq!(progress.run_id(), finish.run_id());
    }

    #[test]
    fn should_serialize_progress_with_type_tag() {
        let run_id = RunId::new();
        let event = RunEvent::Progress(ProgressEvent {
            run_id,
            target: TargetId::new("com.example.mail").unwrap(),
            label: "Mail".to_string(),
            current: 1,
            total: 3,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["target"], "com.example.mail");
        assert_eq!(json["current"], 1);
        assert_eq!(json["total"], 3);
    }
}
