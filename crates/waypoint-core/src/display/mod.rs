//! Display implementations and view types.
//!
//! Domain models implement `Display` directly; read-only queries return
//! owned view types and mutations are formatted through result wrappers.
//! Everything renders markdown, which the CLI passes through its terminal
//! renderer.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │  Views & Result │    │   Formatted     │
//! │ (Plan, Phase)   │───▶│    Wrappers     │───▶│    Markdown     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`plans`]: Read-only views (PlanSummary, StatusCheck, Assignments, ActivePlans)
//! - [`results`]: Mutation and validation result wrappers (OutcomeView, ReportView)
//! - [`status`]: One-line feedback messages (OperationStatus)
//! - [`datetime`]: Date/time formatting utilities
//! - [`models`]: Display implementations for domain models
//!
//! # Examples
//!
//! ```rust
//! use waypoint_core::display::OperationStatus;
//!
//! let status = OperationStatus::failure("No phase currently in_progress");
//! assert_eq!(status.to_string(), "✗ No phase currently in_progress\n");
//! ```

pub mod datetime;
pub mod models;
pub mod plans;
pub mod results;
pub mod status;

pub use datetime::{LocalDateTime, Stamp};
pub use plans::{ActivePlan, ActivePlans, Assignments, PlanSummary, StatusCheck};
pub use results::{OutcomeView, ReportView};
pub use status::{Level, OperationStatus};
