//! Run lifecycle: the single state value owned by the automation runner.

use serde::{Deserialize, Serialize};

use crate::target::Target;

/// Lifecycle state of the automation runner.
///
/// `Finished` is terminal until a new run is started; callers never need to
/// bring the runner back to `Idle` explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running {
        current: Target,
        retry_count: u32,
    },
    Finished {
        aborted: bool,
    },
}

impl RunState {
    /// Whether a run is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// The target currently being processed, if any.
    #[must_use]
    pub fn current_target(&self) -> Option<&Target> {
        match self {
            Self::Running { current, .. } => Some(current),
            Self::Idle | Self::Finished { .. } => None,
        }
    }

    /// Retries already spent on the current target.
    #[must_use]
    pub fn retry_count(&self) -> Option<u32> {
        match self {
            Self::Running { retry_count, .. } => Some(*retry_count),
            Self::Idle | Self::Finished { .. } => None,
        }
    }
}

/// How the runner left a target when it was dequeued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetOutcome {
    /// The confirmation dialog was accepted.
    Stopped,
    /// The retry budget ran out before the sequence completed.
    GaveUp,
}

impl std::fmt::Display for TargetOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => f.write_str("stopped"),
            Self::GaveUp => f.write_str("gave_up"),
        }
    }
}
