//! # forcestop-domain
//!
//! Pure domain model for the forcestop automation runner.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Targets** (applications queued for the force-stop sequence)
//! - Define the **Run** lifecycle (`RunState`, per-target outcomes, status snapshots)
//! - Define **Run events** (progress and finish notifications for observers)
//! - Define the **Screen** vocabulary (event kinds, button selectors, match results)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod event;
pub mod run;
pub mod screen;
pub mod status;
pub mod target;
