//! Core library for the Waypoint plan lifecycle tool.
//!
//! This crate owns every read and write of multi-phase JSON work plans:
//! decoding documents, enforcing the status state machine, recomputing the
//! scheduling index, validating before and after each write, and persisting
//! atomically with daily backups and an archive store.
//!
//! # Architecture
//!
//! - **Models** ([`models`]): Typed view of the plan document, with unknown
//!   keys carried through untouched
//! - **Rules** ([`transitions`], [`graph`], [`schedule`]): Pure functions over
//!   the document
//! - **Validation** ([`validate`]): Structural checks and the pluggable
//!   post-write [`Validator`]
//! - **Persistence** ([`store`]): Atomic saves, backups, archive
//! - **Facade** ([`engine`]): [`LifecycleEngine`], the only entry point that
//!   mutates files
//! - **Display** ([`display`]): Markdown views for the terminal renderer
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use waypoint_core::{EngineBuilder, EngineConfig, params::CompleteCurrent};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::discover(None)?;
//! let engine = EngineBuilder::new().with_config(config).build()?;
//!
//! let plan = "Docs/Plans/plan-billing.json";
//! println!("{}", engine.status_check(plan)?);
//!
//! let outcome = engine.complete_current(
//!     plan,
//!     &CompleteCurrent {
//!         notes: Some("Webhooks verified".to_string()),
//!         actual_effort: Some(5.5),
//!     },
//! )?;
//! println!("{}", waypoint_core::display::OutcomeView(&outcome));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod graph;
pub mod models;
pub mod operations;
pub mod params;
pub mod registry;
pub mod schedule;
pub mod store;
pub mod transitions;
pub mod validate;

// Re-export commonly used types
pub use config::{Clock, EngineConfig, FixedClock, SystemClock};
pub use display::{OperationStatus, OutcomeView, ReportView};
pub use engine::{EngineBuilder, LifecycleEngine, Mutation, Outcome};
pub use error::{LifecycleError, Result};
pub use models::{Phase, PhaseIndex, Plan, Status, Step};
pub use params::{AppendHistory, CompleteCurrent, UpdatePhase, UpdateStep};
pub use registry::{OwnerRegistry, StaticRegistry};
pub use store::PersistenceManager;
pub use transitions::{TransitionPolicy, TransitionTable};
pub use validate::{ValidationReport, Validator};
