//! Target: one application queued for the force-stop sequence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque application identifier (a package name on the reference platform).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetId(String);

impl TargetId {
    /// Create an identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTargetId`] if nothing is left after trimming.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTargetId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TargetId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TargetId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TargetId> for String {
    fn from(id: TargetId) -> Self {
        id.0
    }
}

/// A queued application with its human-readable label.
///
/// The label is resolved once when the queue is built and never changes
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub label: String,
}

impl Target {
    /// Create a target with an explicit label.
    ///
    /// A blank label falls back to the identifier.
    #[must_use]
    pub fn new(id: TargetId, label: impl Into<String>) -> Self {
        let label = label.into();
        if label.trim().is_empty() {
            return Self::unlabelled(id);
        }
        Self { id, label }
    }

    /// Create a target whose label is its identifier.
    #[must_use]
    pub fn unlabelled(id: TargetId) -> Self {
        let label = id.to_string();
        Self { id, label }
    }

    /// Whether the label is still the raw identifier.
    #[must_use]
    pub fn has_fallback_label(&self) -> bool {
        self.label == self.id.as_str()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_fallback_label() {
            f.write_str(&self.label)
        } else {
            write!(f, "{} ({})", self.label, self.id)
        }
    }
}
