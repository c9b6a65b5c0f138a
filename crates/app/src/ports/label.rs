//! Label port: human-readable names for queued targets.

use forcestop_domain::error::ForceStopError;
use forcestop_domain::target::{Target, TargetId};

/// Resolves the display label of an application.
pub trait LabelResolver {
    /// Look up the label of `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ForceStopError::Resolution`] when the platform does not know
    /// the application.
    fn resolve_label(&self, target: &TargetId) -> Result<String, ForceStopError>;

    /// Build a [`Target`], falling back to the identifier as label.
    ///
    /// Never fails: resolution errors are logged and swallowed.
    fn resolve_target(&self, id: TargetId) -> Target {
        match self.resolve_label(&id) {
            Ok(label) => Target::new(id, label),
            Err(err) => {
                tracing::debug!(%err, target_id = %id, "label resolution failed, using identifier");
                Target::unlabelled(id)
            }
        }
    }
}

impl<T: LabelResolver + ?Sized> LabelResolver for std::sync::Arc<T> {
    fn resolve_label(&self, target: &TargetId) -> Result<String, ForceStopError> {
        (**self).resolve_label(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnlyMail;

    impl LabelResolver for OnlyMail {
        fn resolve_label(&self, target: &TargetId) -> Result<String, ForceStopError> {
            if target.as_str() == "com.example.mail" {
                Ok("Mail".to_string())
            } else {
                Err(ForceStopError::resolution(target.clone(), "not installed"))
            }
        }
    }

    #[test]
    fn should_use_resolved_label() {
        let target = OnlyMail.resolve_target(TargetId::new("com.example.mail").unwrap());
        assert_eq!(target.label, "Mail");
    }

    #[test]
    fn should_fall_back_to_identifier_when_resolution_fails() {
        let target = OnlyMail.resolve_target(TargetId::new("com.example.maps").unwrap());
        assert_eq!(target.label, "com.example.maps");
        assert!(target.has_fallback_label());
    }
}
