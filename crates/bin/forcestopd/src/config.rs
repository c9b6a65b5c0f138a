//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `forcestop.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use forcestop_adapter_virtual::{AppBehaviour, VirtualApp, VirtualConfig};
use forcestop_app::settings::{DEFAULT_PROTECTED_TARGETS, RunnerSettings};
use forcestop_domain::error::ValidationError;
use forcestop_domain::screen::ButtonSelector;
use forcestop_domain::target::TargetId;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Runner timing and filtering.
    pub runner: RunnerConfig,
    /// Accepted identifiers and labels of the buttons to press.
    pub buttons: ButtonsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Virtual device setup.
    pub demo: DemoConfig,
}

/// Runner timing and filtering.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub navigation_timeout_ms: u64,
    pub confirm_timeout_ms: u64,
    pub settle_delay_ms: u64,
    pub retry_limit: u32,
    /// Applications that are never force-stopped.
    pub protected_targets: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ButtonsConfig {
    pub confirm: ButtonSelector,
    pub force_stop: ButtonSelector,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Virtual device configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Delay before a changed screen is reported.
    pub render_delay_ms: u64,
    /// Installed applications. Empty means the built-in demo set.
    pub apps: Vec<DemoApp>,
}

/// One installed application of the virtual device.
#[derive(Debug, Deserialize)]
pub struct DemoApp {
    pub id: String,
    pub label: String,
    #[serde(default = "default_running")]
    pub running: bool,
    #[serde(default)]
    pub behaviour: DemoBehaviour,
}

/// See [`AppBehaviour`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoBehaviour {
    #[default]
    Normal,
    Unresponsive,
    NoDialog,
}

fn default_running() -> bool {
    true
}

impl Config {
    /// Load configuration from `forcestop.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("forcestop.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(ms) = env_number("FORCESTOP_NAVIGATION_TIMEOUT_MS") {
            self.runner.navigation_timeout_ms = ms;
        }
        if let Some(ms) = env_number("FORCESTOP_SETTLE_DELAY_MS") {
            self.runner.settle_delay_ms = ms;
        }
        if let Some(limit) = env_number("FORCESTOP_RETRY_LIMIT") {
            self.runner.retry_limit = limit;
        }
        if let Ok(val) = std::env::var("FORCESTOP_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.demo.render_delay_ms == 0 {
            return Err(ConfigError::Validation(
                "demo.render_delay_ms must be non-zero".to_string(),
            ));
        }
        self.runner_settings()?;
        self.virtual_config()?;
        Ok(())
    }

    /// Build the runner settings.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty protected target, a zero timeout or a
    /// button selector that matches nothing.
    pub fn runner_settings(&self) -> Result<RunnerSettings, ConfigError> {
        let protected_targets = self
            .runner
            .protected_targets
            .iter()
            .map(TargetId::new)
            .collect::<Result<_, _>>()?;
        let settings = RunnerSettings {
            navigation_timeout: Duration::from_millis(self.runner.navigation_timeout_ms),
            confirm_timeout: Duration::from_millis(self.runner.confirm_timeout_ms),
            settle_delay: Duration::from_millis(self.runner.settle_delay_ms),
            retry_limit: self.runner.retry_limit,
            protected_targets,
            confirm_button: self.buttons.confirm.clone(),
            force_stop_button: self.buttons.force_stop.clone(),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Build the virtual device setup.
    ///
    /// # Errors
    ///
    /// Returns an error for an application with an empty identifier.
    pub fn virtual_config(&self) -> Result<VirtualConfig, ConfigError> {
        let mut config = VirtualConfig {
            render_delay: Duration::from_millis(self.demo.render_delay_ms),
            ..VirtualConfig::default()
        };
        if !self.demo.apps.is_empty() {
            config.apps = self
                .demo
                .apps
                .iter()
                .map(DemoApp::to_virtual)
                .collect::<Result<_, _>>()?;
        }
        Ok(config)
    }
}

impl DemoApp {
    fn to_virtual(&self) -> Result<VirtualApp, ValidationError> {
        let behaviour = match self.behaviour {
            DemoBehaviour::Normal => AppBehaviour::Normal,
            DemoBehaviour::Unresponsive => AppBehaviour::Unresponsive,
            DemoBehaviour::NoDialog => AppBehaviour::NoDialog,
        };
        let app = VirtualApp::running(TargetId::new(&self.id)?, self.label.clone())
            .with_behaviour(behaviour);
        Ok(if self.running { app } else { app.stopped() })
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 5_000,
            confirm_timeout_ms: 2_000,
            settle_delay_ms: 500,
            retry_limit: 1,
            protected_targets: DEFAULT_PROTECTED_TARGETS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self {
            confirm: ButtonSelector::confirm(),
            force_stop: ButtonSelector::force_stop(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "forcestopd=info,forcestop=info".to_string(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            render_delay_ms: 700,
            apps: Vec::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// A value the runner or the virtual device rejects.
    #[error("invalid configuration")]
    Settings(#[from] ValidationError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
