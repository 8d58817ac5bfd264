//! Data models for plans, phases and steps.
//!
//! The models mirror the on-disk JSON document. Fields the engine reads or
//! writes are typed; everything else is carried in `extra` maps so a load
//! followed by a save preserves keys the engine does not understand.
//! Display implementations live in [`crate::display::models`].
//!
//! # Examples
//!
//! ```rust
//! use waypoint_core::models::{Phase, Plan, Status};
//!
//! let mut plan = Plan::default();
//! plan.phases.push(Phase::new(1, "Setup"));
//! plan.phases.push(Phase::new(2, "Build"));
//!
//! assert_eq!(plan.phases_with(Status::NotStarted).count(), 2);
//! assert!(!plan.all_completed());
//! ```

pub mod index;
pub mod phase;
pub mod plan;
pub mod status;

#[cfg(test)]
mod tests;

pub use index::PhaseIndex;
pub use phase::{Blocker, DependencyRef, Effort, Phase, Step};
pub use plan::{HistoryEntry, Metadata, Plan, Planning};
pub use status::Status;
