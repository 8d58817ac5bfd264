//! Derived scheduling index model.

use serde::{Deserialize, Serialize};

/// Summary of phase statuses and the next eligible phase.
///
/// Written to `phase_index` on every save. Built by
/// [`crate::schedule::build_index`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PhaseIndex {
    /// Number of phases in the plan
    pub total: usize,

    /// First in-progress phase in declaration order
    pub current_in_progress: Option<u32>,

    pub completed: Vec<u32>,

    pub in_progress: Vec<u32>,

    pub blocked: Vec<u32>,

    pub not_started: Vec<u32>,

    /// First not-started phase whose dependencies are all completed
    pub next_available: Option<u32>,
}
