//! # forcestop-adapter-virtual
//!
//! Virtual/demo platform that simulates the settings app of a device for
//! testing and demonstration purposes.
//!
//! ## Simulated screens
//!
//! | Page | Reached by | Notification |
//! |------|------------|--------------|
//! | App info | navigating to an installed app | `WindowStateChanged` |
//! | Confirmation dialog | pressing "Force stop" | `WindowStateChanged` |
//! | App info, stopped | pressing "OK" in the dialog | `WindowContentChanged` |
//!
//! Every notification is delivered after a render delay, carrying a
//! snapshot of the screen at delivery time. A notification is dropped when
//! the screen changed again in the meantime.
//!
//! ## Dependency rule
//!
//! Depends on `forcestop-app` (port traits) and `forcestop-domain` only.

mod app;
mod error;
mod screen;

pub use app::{AppBehaviour, VirtualApp};
pub use error::VirtualError;
pub use screen::{Page, VirtualNode, VirtualScreen};

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;

use forcestop_app::ports::{LabelResolver, ScreenDriver, UiElement};
use forcestop_domain::error::ForceStopError;
use forcestop_domain::screen::{CONFIRM_BUTTON_ID, FORCE_STOP_BUTTON_ID, ScreenEventKind};
use forcestop_domain::target::TargetId;

use screen::CANCEL_BUTTON_ID;

/// Default delay between a screen change and its notification.
pub const DEFAULT_RENDER_DELAY: Duration = Duration::from_millis(700);

/// Virtual device setup.
#[derive(Debug, Clone)]
pub struct VirtualConfig {
    /// Delay before a changed screen is reported.
    pub render_delay: Duration,
    pub apps: Vec<VirtualApp>,
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            render_delay: DEFAULT_RENDER_DELAY,
            apps: app::demo_apps(),
        }
    }
}

/// A screen-state change reported by the virtual device.
#[derive(Debug, Clone)]
pub struct ScreenNotification {
    pub kind: ScreenEventKind,
    pub snapshot: VirtualScreen,
}

struct State {
    apps: BTreeMap<TargetId, VirtualApp>,
    page: Page,
    generation: u64,
    navigations: Vec<TargetId>,
}

/// Simulated settings app, usable as [`ScreenDriver`] and [`LabelResolver`].
///
/// Clones share the same device.
#[derive(Clone)]
pub struct VirtualPlatform {
    state: Arc<Mutex<State>>,
    notifications: mpsc::UnboundedSender<ScreenNotification>,
    render_delay: Duration,
}

impl VirtualPlatform {
    /// Create a device and the receiving end of its screen notifications.
    #[must_use]
    pub fn new(config: VirtualConfig) -> (Self, mpsc::UnboundedReceiver<ScreenNotification>) {
        let (notifications, receiver) = mpsc::unbounded_channel();
        let apps = config
            .apps
            .into_iter()
            .map(|app| (app.id.clone(), app))
            .collect();
        let platform = Self {
            state: Arc::new(Mutex::new(State {
                apps,
                page: Page::Home,
                generation: 0,
                navigations: Vec::new(),
            })),
            notifications,
            render_delay: config.render_delay,
        };
        (platform, receiver)
    }

    /// Page currently shown.
    #[must_use]
    pub fn page(&self) -> Page {
        self.lock_state().page.clone()
    }

    /// Whether `id` is installed and running.
    #[must_use]
    pub fn is_running(&self, id: &TargetId) -> Option<bool> {
        self.lock_state().apps.get(id).map(|app| app.running)
    }

    /// Every navigation request received so far, in order.
    #[must_use]
    pub fn navigations(&self) -> Vec<TargetId> {
        self.lock_state().navigations.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch to `page` and report it after the render delay.
    ///
    /// `kind: None` switches silently, as a screen that never finishes loading.
    fn show(&self, state: &mut State, page: Page, kind: Option<ScreenEventKind>) {
        state.page = page;
        state.generation += 1;
        let Some(kind) = kind else { return };

        let generation = state.generation;
        let platform = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(platform.render_delay).await;
            platform.deliver(generation, kind);
        });
    }

    fn deliver(&self, generation: u64, kind: ScreenEventKind) {
        let snapshot = {
            let state = self.lock_state();
            if state.generation != generation {
                tracing::trace!(?kind, "screen changed before rendering, notification dropped");
                return;
            }
            VirtualScreen::render(&state.page, &state.apps)
        };
        if self
            .notifications
            .send(ScreenNotification { kind, snapshot })
            .is_err()
        {
            tracing::debug!("no listener for screen notifications");
        }
    }

    fn press_force_stop(&self, state: &mut State, id: TargetId) {
        let behaviour = state.apps.get(&id).map(|app| app.behaviour);
        if behaviour == Some(AppBehaviour::NoDialog) {
            tracing::debug!(target_id = %id, "force stop pressed, no dialog shown");
            return;
        }
        self.show(
            state,
            Page::ConfirmDialog(id),
            Some(ScreenEventKind::WindowStateChanged),
        );
    }

    fn confirm(&self, state: &mut State, id: TargetId) {
        if let Some(app) = state.apps.get_mut(&id) {
            app.running = false;
            tracing::info!(target_id = %id, label = %app.label, "virtual app force stopped");
        }
        self.show(
            state,
            Page::AppInfo(id),
            Some(ScreenEventKind::WindowContentChanged),
        );
    }
}

impl ScreenDriver for VirtualPlatform {
    type Snapshot = VirtualScreen;

    fn navigate_to_target(&self, target: &TargetId) -> Result<(), ForceStopError> {
        let mut state = self.lock_state();
        state.navigations.push(target.clone());

        match state.apps.get(target).map(|app| app.behaviour) {
            None => Err(ForceStopError::navigation(
                target.clone(),
                VirtualError::UnknownApp(target.clone()),
            )),
            Some(AppBehaviour::Unresponsive) => {
                tracing::debug!(target_id = %target, "app info screen never finishes loading");
                self.show(&mut state, Page::Home, None);
                Ok(())
            }
            Some(_) => {
                self.show(
                    &mut state,
                    Page::AppInfo(target.clone()),
                    Some(ScreenEventKind::WindowStateChanged),
                );
                Ok(())
            }
        }
    }

    fn activate(&self, element: &&VirtualNode) -> Result<(), ForceStopError> {
        let element: &VirtualNode = element;
        let described = element.describe();
        let mut state = self.lock_state();

        let shown = VirtualScreen::render(&state.page, &state.apps);
        let Some(node) = shown.locate(element) else {
            return Err(ForceStopError::activation(
                described.clone(),
                VirtualError::NotOnScreen(described),
            ));
        };
        if !node.enabled {
            return Err(ForceStopError::activation(
                described.clone(),
                VirtualError::Disabled(described),
            ));
        }

        match state.page.clone() {
            Page::AppInfo(id) if node.has_stable_id(FORCE_STOP_BUTTON_ID) => {
                self.press_force_stop(&mut state, id);
            }
            Page::ConfirmDialog(id) if node.has_stable_id(CONFIRM_BUTTON_ID) => {
                self.confirm(&mut state, id);
            }
            Page::ConfirmDialog(id) if node.has_stable_id(CANCEL_BUTTON_ID) => {
                self.show(
                    &mut state,
                    Page::AppInfo(id),
                    Some(ScreenEventKind::WindowStateChanged),
                );
            }
            _ => tracing::debug!(element = %described, "press has no effect"),
        }
        Ok(())
    }
}

impl LabelResolver for VirtualPlatform {
    fn resolve_label(&self, target: &TargetId) -> Result<String, ForceStopError> {
        self.lock_state()
            .apps
            .get(target)
            .map(|app| app.label.clone())
            .ok_or_else(|| {
                ForceStopError::resolution(target.clone(), VirtualError::UnknownApp(target.clone()))
            })
    }
}
