//! Runner tuning: timeouts, retry budget, protected targets, button selectors.

use std::collections::BTreeSet;
use std::time::Duration;

use forcestop_domain::error::ValidationError;
use forcestop_domain::screen::{ButtonKind, ButtonSelector};
use forcestop_domain::target::TargetId;

/// Applications that are never force-stopped, whatever the caller asks.
pub const DEFAULT_PROTECTED_TARGETS: &[&str] = &[
    "android",
    "com.android.systemui",
    "com.android.settings",
    "com.android.vending",
    "com.google.android.gms",
];

/// Settings for one [`AutomationRunner`](crate::runner::AutomationRunner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    /// How long to wait for a target's screen after each navigation.
    pub navigation_timeout: Duration,
    /// How long to wait for the confirmation dialog once the settle delay is over.
    pub confirm_timeout: Duration,
    /// Pause after pressing "Force stop" during which notifications are ignored.
    pub settle_delay: Duration,
    /// Re-navigations allowed per target before giving up on it.
    pub retry_limit: u32,
    /// Targets dropped from every queue.
    pub protected_targets: BTreeSet<TargetId>,
    pub confirm_button: ButtonSelector,
    pub force_stop_button: ButtonSelector,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(5),
            confirm_timeout: Duration::from_secs(2),
            settle_delay: Duration::from_millis(500),
            retry_limit: 1,
            protected_targets: DEFAULT_PROTECTED_TARGETS
                .iter()
                .filter_map(|id| TargetId::new(id).ok())
                .collect(),
            confirm_button: ButtonSelector::confirm(),
            force_stop_button: ButtonSelector::force_stop(),
        }
    }
}

impl RunnerSettings {
    /// Check that the settings can drive a run.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroDuration`] for a zero timeout or delay,
    /// and [`ValidationError::EmptySelector`] for a selector that matches nothing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("navigation_timeout", self.navigation_timeout),
            ("confirm_timeout", self.confirm_timeout),
            ("settle_delay", self.settle_delay),
        ] {
            if value.is_zero() {
                return Err(ValidationError::ZeroDuration { field });
            }
        }
        self.confirm_button.validate(ButtonKind::Confirm)?;
        self.force_stop_button.validate(ButtonKind::ForceStop)?;
        Ok(())
    }

    /// Whether `target` must never be queued.
    #[must_use]
    pub fn is_protected(&self, target: &TargetId) -> bool {
        self.protected_targets.contains(target)
    }

    /// Worst-case time spent on a single unresponsive target.
    #[must_use]
    pub fn worst_case_per_target(&self) -> Duration {
        self.navigation_timeout * (self.retry_limit + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let settings = RunnerSettings::default();
        assert_eq!(settings.navigation_timeout, Duration::from_secs(5));
        assert_eq!(settings.settle_delay, Duration::from_millis(500));
        assert_eq!(settings.retry_limit, 1);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn should_protect_system_packages_by_default() {
        let settings = RunnerSettings::default();
        assert!(settings.is_protected(&TargetId::new("com.android.systemui").unwrap()));
        assert!(!settings.is_protected(&TargetId::new("com.example.mail").unwrap()));
    }

    #[test]
    fn should_reject_zero_settle_delay() {
        let settings = RunnerSettings {
            settle_delay: Duration::ZERO,
            ..RunnerSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ValidationError::ZeroDuration {
                field: "settle_delay"
            })
        );
    }

    #[test]
    fn should_reject_empty_force_stop_selector() {
        let settings = RunnerSettings {
            force_stop_button: ButtonSelector::default(),
            ..RunnerSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ValidationError::EmptySelector {
                button: "force_stop"
            })
        );
    }

    #[test]
    fn should_bound_time_per_target_by_retry_budget() {
        let settings = RunnerSettings::default();
        assert_eq!(settings.worst_case_per_target(), Duration::from_secs(10));
    }
}
