//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ForceStopError`] when crossing a port boundary.

use crate::target::TargetId;

/// Boxed source error produced by an adapter.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for the forcestop workspace.
#[derive(Debug, thiserror::Error)]
pub enum ForceStopError {
    /// A start request arrived while a run was still in progress.
    #[error("an automation run is already in progress")]
    AlreadyRunning,

    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The human-readable label of a target could not be resolved.
    #[error("failed to resolve label for {target}")]
    Resolution {
        target: TargetId,
        #[source]
        source: BoxError,
    },

    /// The settings screen of a target could not be opened.
    #[error("failed to open the settings screen of {target}")]
    Navigation {
        target: TargetId,
        #[source]
        source: BoxError,
    },

    /// A matched on-screen element could not be activated.
    #[error("failed to activate element {element}")]
    Activation {
        element: String,
        #[source]
        source: BoxError,
    },

    /// The runner task has stopped and no longer accepts commands.
    #[error("automation runner is not available")]
    RunnerGone,
}

impl ForceStopError {
    /// Build a [`ForceStopError::Resolution`] from any adapter error.
    pub fn resolution(target: TargetId, source: impl Into<BoxError>) -> Self {
        Self::Resolution {
            target,
            source: source.into(),
        }
    }

    /// Build a [`ForceStopError::Navigation`] from any adapter error.
    pub fn navigation(target: TargetId, source: impl Into<BoxError>) -> Self {
        Self::Navigation {
            target,
            source: source.into(),
        }
    }

    /// Build a [`ForceStopError::Activation`] from any adapter error.
    pub fn activation(element: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Activation {
            element: element.into(),
            source: source.into(),
        }
    }
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A target identifier was empty or whitespace.
    #[error("target identifier must not be empty")]
    EmptyTargetId,

    /// A button selector has neither a stable identifier nor a label.
    #[error("{button} button needs at least one stable identifier or label")]
    EmptySelector { button: &'static str },

    /// A duration setting was zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
}
