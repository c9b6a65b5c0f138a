//! Virtual platform error types.

use forcestop_domain::target::TargetId;

/// Errors raised by the simulated settings app.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VirtualError {
    /// The application is not installed on the virtual device.
    #[error("application {0} is not installed")]
    UnknownApp(TargetId),

    /// The element is not part of the screen currently shown.
    #[error("element {0} is not on the current screen")]
    NotOnScreen(String),

    /// The element is shown but greyed out.
    #[error("element {0} is disabled")]
    Disabled(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_unknown_app_error() {
        let err = VirtualError::UnknownApp(TargetId::new("com.example.gone").unwrap());
        assert_eq!(err.to_string(), "application com.example.gone is not installed");
    }

    #[test]
    fn should_display_not_on_screen_error() {
        let err = VirtualError::NotOnScreen("android:id/button1".to_string());
        assert_eq!(
            err.to_string(),
            "element android:id/button1 is not on the current screen"
        );
    }

    #[test]
    fn should_display_disabled_error() {
        let err = VirtualError::Disabled("\"Force stop\"".to_string());
        assert_eq!(err.to_string(), "element \"Force stop\" is disabled");
    }
}
