//! Screen-state matcher: recognises the two buttons of the force-stop
//! sequence in a snapshot.
//!
//! The confirmation dialog is looked for first: it can only be on screen
//! after "Force stop" was pressed, and the stop button underneath may still
//! be reported by the platform.

use forcestop_domain::screen::{ButtonKind, ButtonSelector, ScreenEventKind};

use crate::ports::{ScreenSnapshot, UiElement};

/// Result of matching one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult<E> {
    /// Nothing actionable on screen.
    None,
    /// The confirmation dialog's positive button, enabled.
    ConfirmButton(E),
    /// The "Force stop" button, enabled.
    StopButton(E),
}

impl<E> MatchResult<E> {
    /// Which button matched, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ButtonKind> {
        match self {
            Self::None => None,
            Self::ConfirmButton(_) => Some(ButtonKind::Confirm),
            Self::StopButton(_) => Some(ButtonKind::ForceStop),
        }
    }
}

/// Finds actionable buttons using stable identifiers first, then labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenMatcher {
    confirm: ButtonSelector,
    force_stop: ButtonSelector,
}

impl Default for ScreenMatcher {
    fn default() -> Self {
        Self::new(ButtonSelector::confirm(), ButtonSelector::force_stop())
    }
}

impl ScreenMatcher {
    /// Create a matcher for the given confirm and force-stop selectors.
    #[must_use]
    pub fn new(confirm: ButtonSelector, force_stop: ButtonSelector) -> Self {
        Self {
            confirm,
            force_stop,
        }
    }

    /// Match a notification against the expected screens.
    ///
    /// Notifications that cannot reveal a new screen are ignored without
    /// looking at the snapshot.
    pub fn match_screen<'s, S: ScreenSnapshot>(
        &self,
        kind: ScreenEventKind,
        snapshot: &'s S,
    ) -> MatchResult<S::Element<'s>> {
        if !kind.triggers_matching() {
            return MatchResult::None;
        }
        if let Some(element) = find_enabled(&self.confirm, snapshot) {
            return MatchResult::ConfirmButton(element);
        }
        if let Some(element) = find_enabled(&self.force_stop, snapshot) {
            return MatchResult::StopButton(element);
        }
        MatchResult::None
    }
}

fn find_enabled<'s, S: ScreenSnapshot>(
    selector: &ButtonSelector,
    snapshot: &'s S,
) -> Option<S::Element<'s>> {
    let by_id = usable(&selector.stable_ids)
        .find_map(|id| first_enabled(snapshot.find_by_stable_id(id)));
    by_id.or_else(|| {
        usable(&selector.labels).find_map(|label| first_enabled(snapshot.find_by_text(label)))
    })
}

fn usable(values: &[String]) -> impl Iterator<Item = &str> {
    values
        .iter()
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn first_enabled<E: UiElement>(candidates: Vec<E>) -> Option<E> {
    candidates.into_iter().find(UiElement::is_enabled)
}
