//! Virtual screen tree: the snapshots delivered with notifications.

use std::collections::BTreeMap;

use forcestop_app::ports::{ScreenSnapshot, UiElement};
use forcestop_domain::screen::{
    CONFIRM_BUTTON_ID, CONFIRM_BUTTON_LABEL, FORCE_STOP_BUTTON_ID, FORCE_STOP_BUTTON_LABEL,
};
use forcestop_domain::target::TargetId;

use crate::app::VirtualApp;

pub(crate) const CANCEL_BUTTON_ID: &str = "android:id/button2";
const HEADER_TITLE_ID: &str = "com.android.settings:id/entity_header_title";
const OPEN_BUTTON_ID: &str = "com.android.settings:id/launch_button";
const DIALOG_TITLE_ID: &str = "android:id/alertTitle";

/// Page currently shown by the settings app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Home,
    AppInfo(TargetId),
    ConfirmDialog(TargetId),
}

/// One node of the virtual UI tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualNode {
    pub stable_id: Option<String>,
    pub text: String,
    pub enabled: bool,
}

impl VirtualNode {
    fn new(stable_id: &str, text: impl Into<String>, enabled: bool) -> Self {
        Self {
            stable_id: Some(stable_id.to_string()),
            text: text.into(),
            enabled,
        }
    }

    fn text(text: &str) -> Self {
        Self {
            stable_id: None,
            text: text.to_string(),
            enabled: true,
        }
    }

    pub(crate) fn has_stable_id(&self, id: &str) -> bool {
        self.stable_id.as_deref() == Some(id)
    }

    pub(crate) fn has_text(&self, text: &str) -> bool {
        self.text.trim().eq_ignore_ascii_case(text.trim())
    }
}

impl UiElement for VirtualNode {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn describe(&self) -> String {
        match &self.stable_id {
            Some(id) => id.clone(),
            None => format!("{:?}", self.text),
        }
    }
}

/// Captured state of the virtual UI tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualScreen {
    pub nodes: Vec<VirtualNode>,
}

impl VirtualScreen {
    pub(crate) fn home() -> Self {
        Self {
            nodes: vec![VirtualNode::text("Settings"), VirtualNode::text("Apps")],
        }
    }

    pub(crate) fn app_info(app: &VirtualApp) -> Self {
        Self {
            nodes: vec![
                VirtualNode::new(HEADER_TITLE_ID, app.label.clone(), true),
                VirtualNode::new(OPEN_BUTTON_ID, "Open", app.running),
                VirtualNode::new(FORCE_STOP_BUTTON_ID, FORCE_STOP_BUTTON_LABEL, app.running),
            ],
        }
    }

    pub(crate) fn confirm_dialog() -> Self {
        Self {
            nodes: vec![
                VirtualNode::new(DIALOG_TITLE_ID, "Force stop?", true),
                VirtualNode::text("If you force stop an app, it may misbehave."),
                VirtualNode::new(CANCEL_BUTTON_ID, "Cancel", true),
                VirtualNode::new(CONFIRM_BUTTON_ID, CONFIRM_BUTTON_LABEL, true),
            ],
        }
    }

    /// Render `page`, looking up the application it shows.
    pub(crate) fn render(page: &Page, apps: &BTreeMap<TargetId, VirtualApp>) -> Self {
        match page {
            Page::Home => Self::home(),
            Page::AppInfo(id) => apps.get(id).map_or_else(Self::home, Self::app_info),
            Page::ConfirmDialog(_) => Self::confirm_dialog(),
        }
    }

    /// The node of this screen equal to `element`, if shown.
    pub(crate) fn locate(&self, element: &VirtualNode) -> Option<&VirtualNode> {
        self.nodes
            .iter()
            .find(|node| node.stable_id == element.stable_id && node.text == element.text)
    }
}

impl ScreenSnapshot for VirtualScreen {
    type Element<'a> = &'a VirtualNode;

    fn find_by_stable_id(&self, id: &str) -> Vec<&VirtualNode> {
        self.nodes.iter().filter(|n| n.has_stable_id(id)).collect()
    }

    /// Case-insensitive, whole-text comparison.
    fn find_by_text(&self, text: &str) -> Vec<&VirtualNode> {
        self.nodes.iter().filter(|n| n.has_text(text)).collect()
    }
}
