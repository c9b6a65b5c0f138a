//! Applications installed on the virtual device.

use forcestop_domain::target::TargetId;

/// How an application's settings screens react to the automation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppBehaviour {
    /// Screens render and the dialog appears as on a real device.
    #[default]
    Normal,
    /// The details screen never finishes loading.
    Unresponsive,
    /// Pressing "Force stop" does nothing; no dialog is shown.
    NoDialog,
}

/// An installed application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualApp {
    pub id: TargetId,
    pub label: String,
    pub running: bool,
    pub behaviour: AppBehaviour,
}

impl VirtualApp {
    /// A running application with [`AppBehaviour::Normal`].
    #[must_use]
    pub fn running(id: TargetId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            running: true,
            behaviour: AppBehaviour::Normal,
        }
    }

    #[must_use]
    pub fn with_behaviour(mut self, behaviour: AppBehaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    #[must_use]
    pub fn stopped(mut self) -> Self {
        self.running = false;
        self
    }
}

/// Applications installed on a fresh virtual device.
pub(crate) fn demo_apps() -> Vec<VirtualApp> {
    [
        ("com.example.mail", "Mail", AppBehaviour::Normal),
        ("com.example.maps", "Maps", AppBehaviour::Normal),
        ("com.example.music", "Music", AppBehaviour::Normal),
        ("com.example.chat", "Chat", AppBehaviour::Normal),
        ("com.example.frozen", "Frozen", AppBehaviour::Unresponsive),
    ]
    .into_iter()
    .filter_map(|(id, label, behaviour)| {
        TargetId::new(id)
            .ok()
            .map(|id| VirtualApp::running(id, label).with_behaviour(behaviour))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_install_demo_apps_running() {
        let apps = demo_apps();
        assert_eq!(apps.len(), 5);
        assert!(apps.iter().all(|app| app.running));
    }

    #[test]
    fn should_build_stopped_app_with_behaviour() {
        let app = VirtualApp::running(TargetId::new("com.example.mail").unwrap(), "Mail")
            .with_behaviour(AppBehaviour::NoDialog)
            .stopped();
        assert!(!app.running);
        assert_eq!(app.behaviour, AppBehaviour::NoDialog);
    }
}
