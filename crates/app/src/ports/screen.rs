//! Screen ports: observing and driving the platform's settings UI.
//!
//! The UI tree is owned by the platform. The runner only ever sees it
//! through a [`ScreenSnapshot`] for the duration of one notification and
//! acts on it through a [`ScreenDriver`].

use forcestop_domain::error::ForceStopError;
use forcestop_domain::target::TargetId;

/// An element found in a snapshot.
pub trait UiElement {
    /// Whether the element currently accepts interaction.
    fn is_enabled(&self) -> bool;

    /// Short description for logs (identifier or text).
    fn describe(&self) -> String;
}

impl<T: UiElement + ?Sized> UiElement for &T {
    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Read-only view of the UI tree at one point in time.
pub trait ScreenSnapshot {
    /// Element handle borrowed from the snapshot.
    type Element<'a>: UiElement
    where
        Self: 'a;

    /// All elements whose stable identifier equals `id`.
    fn find_by_stable_id(&self, id: &str) -> Vec<Self::Element<'_>>;

    /// All elements whose visible text matches `text`.
    ///
    /// The comparison rules (case, partial matches) belong to the platform.
    fn find_by_text(&self, text: &str) -> Vec<Self::Element<'_>>;
}

/// Side effects the runner issues on the platform.
///
/// Both calls are fire-and-forget: they return once the request has been
/// handed to the platform, not once the screen has changed.
pub trait ScreenDriver {
    /// Snapshot type delivered with screen-state notifications.
    type Snapshot: ScreenSnapshot;

    /// Open the application details screen of `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ForceStopError::Navigation`] if the request could not be issued.
    fn navigate_to_target(&self, target: &TargetId) -> Result<(), ForceStopError>;

    /// Click `element`.
    ///
    /// # Errors
    ///
    /// Returns [`ForceStopError::Activation`] if the click could not be issued.
    fn activate(
        &self,
        element: &<Self::Snapshot as ScreenSnapshot>::Element<'_>,
    ) -> Result<(), ForceStopError>;
}
