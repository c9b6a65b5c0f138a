//! Screen vocabulary: what the runner understands about the external UI.
//!
//! The actual UI tree is owned by the platform and reached through the
//! `ScreenSnapshot` port in the `app` crate. This module only describes the
//! kinds of change notifications and how the two buttons of the force-stop
//! sequence are recognised.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Stable identifier of the confirmation dialog's positive button.
pub const CONFIRM_BUTTON_ID: &str = "android:id/button1";
/// Visible text of the confirmation dialog's positive button.
pub const CONFIRM_BUTTON_LABEL: &str = "OK";
/// Stable identifier of the app-info "Force stop" button.
pub const FORCE_STOP_BUTTON_ID: &str = "com.android.settings:id/force_stop_button";
/// Visible text of the app-info "Force stop" button.
pub const FORCE_STOP_BUTTON_LABEL: &str = "Force stop";

/// Kind of screen-state change notification delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenEventKind {
    /// A window appeared, disappeared or changed its top-level state.
    WindowStateChanged,
    /// The content of a window changed.
    WindowContentChanged,
    ViewClicked,
    ViewFocused,
    ViewScrolled,
    Other,
}

impl ScreenEventKind {
    /// Whether notifications of this kind can reveal a new dialog or button.
    ///
    /// Only window-level changes are matched; per-view notifications fire
    /// far more often and never bring a new screen on their own.
    #[must_use]
    pub fn triggers_matching(self) -> bool {
        matches!(self, Self::WindowStateChanged | Self::WindowContentChanged)
    }
}

/// Which step of the sequence a button belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    /// Positive button of the "Force stop?" confirmation dialog.
    Confirm,
    /// "Force stop" button on the application details screen.
    ForceStop,
}

impl std::fmt::Display for ButtonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirm => f.write_str("confirm"),
            Self::ForceStop => f.write_str("force_stop"),
        }
    }
}

/// Accepted stable identifiers and labels for one button.
///
/// Identifiers are tried first, in order; labels are the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonSelector {
    pub stable_ids: Vec<String>,
    pub labels: Vec<String>,
}

impl ButtonSelector {
    /// Selector for the confirmation dialog's positive button.
    #[must_use]
    pub fn confirm() -> Self {
        Self {
            stable_ids: vec![CONFIRM_BUTTON_ID.to_string()],
            labels: vec![CONFIRM_BUTTON_LABEL.to_string()],
        }
    }

    /// Selector for the "Force stop" button.
    #[must_use]
    pub fn force_stop() -> Self {
        Self {
            stable_ids: vec![FORCE_STOP_BUTTON_ID.to_string()],
            labels: vec![FORCE_STOP_BUTTON_LABEL.to_string()],
        }
    }

    /// Check that the selector can match anything at all.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySelector`] when both lists are empty
    /// (blank entries do not count).
    pub fn validate(&self, button: ButtonKind) -> Result<(), ValidationError> {
        let usable = self
            .stable_ids
            .iter()
            .chain(&self.labels)
            .any(|value| !value.trim().is_empty());
        if usable {
            Ok(())
        } else {
            Err(ValidationError::EmptySelector {
                button: match button {
                    ButtonKind::Confirm => "confirm",
                    ButtonKind::ForceStop => "force_stop",
                },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_match_only_window_level_changes() {
        assert!(ScreenEventKind::WindowContentChanged.triggers_matching());
        assert!(ScreenEventKind::WindowStateChanged.triggers_matching());
        assert!(!ScreenEventKind::ViewClicked.triggers_matching());
        assert!(!ScreenEventKind::ViewFocused.triggers_matching());
        assert!(!ScreenEventKind::ViewScrolled.triggers_matching());
        assert!(!ScreenEventKind::Other.triggers_matching());
    }

    #[test]
    fn should_provide_platform_defaults() {
        let confirm = ButtonSelector::confirm();
        assert_eq!(confirm.stable_ids, vec!["android:id/button1"]);
        assert_eq!(confirm.labels, vec!["OK"]);

        let stop = ButtonSelector::force_stop();
        assert_eq!(
            stop.stable_ids,
            vec!["com.android.settings:id/force_stop_button"]
        );
        assert_eq!(stop.labels, vec!["Force stop"]);
    }

    #[test]
    fn should_accept_selector_with_only_labels() {
        let selector = ButtonSelector {
            stable_ids: Vec::new(),
            labels: vec!["Stop".to_string()],
        };
        assert!(selector.validate(ButtonKind::ForceStop).is_ok());
    }

    #[test]
    fn should_reject_selector_with_only_blank_entries() {
        let selector = ButtonSelector {
            stable_ids: vec![String::new()],
            labels: vec!["  ".to_string()],
        };
        assert_eq!(
            selector.validate(ButtonKind::Confirm),
            Err(ValidationError::EmptySelector { button: "confirm" })
        );
    }

    #[test]
    fn should_deserialize_partial_selector() {
        let selector: ButtonSelector =
            serde_json::from_str(r#"{"labels": ["Arrêter"]}"#).unwrap();
        assert!(selector.stable_ids.is_empty());
        assert_eq!(selector.labels, vec!["Arrêter"]);
    }
}
