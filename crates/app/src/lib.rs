//! # forcestop-app
//!
//! Application layer: the automation runner and its **port definitions**
//! (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ScreenSnapshot` / `UiElement`: read access to a captured screen
//!   - `ScreenDriver`: navigate to a target's settings screen, press a button
//!   - `LabelResolver`: human-readable label for a target
//!   - `EventPublisher`: progress and finish notifications
//! - Match screens against the known dialogs (`ScreenMatcher`)
//! - Drive one target at a time through the force-stop sequence
//!   (`AutomationRunner`), with deadlines and a bounded retry budget
//! - Serialize every trigger through a single tokio task (`RunnerTask`)
//!   reachable through a cloneable `RunnerHandle`
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `forcestop-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod matcher;
pub mod ports;
pub mod runner;
pub mod settings;
pub mod task;
pub mod timer;
