//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the automation runner and the platform.
//! They are defined here (in `app`) so that both the runner and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod event_bus;
pub mod label;
pub mod screen;

pub use event_bus::EventPublisher;
pub use label::LabelResolver;
pub use screen::{ScreenDriver, ScreenSnapshot, UiElement};
