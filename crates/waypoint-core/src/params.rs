//! Parameter structures for lifecycle operations.
//!
//! Interface layers (the `wp` binary today) define their own argument types
//! with framework derives and convert into these:
//!
//! ```ignore
//! impl From<PhaseArgs> for UpdatePhase {
//!     fn from(args: PhaseArgs) -> Self {
//!         UpdatePhase { phase: args.phase, status: args.status, ..Default::default() }
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{engine::Mutation, models::Status};

/// Several edits to one phase, applied in one transaction.
///
/// Edits apply in field order: status, completion, actual effort, owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePhase {
    pub phase: u32,
    pub status: Option<Status>,
    pub completion: Option<i64>,
    pub actual_effort: Option<f64>,
    pub owner: Option<String>,

    /// Completion notes, recorded when the status becomes `completed`
    pub notes: Option<String>,
}

impl UpdatePhase {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.completion.is_none()
            && self.actual_effort.is_none()
            && self.owner.is_none()
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        let mut mutations = Vec::new();
        if let Some(status) = self.status {
            mutations.push(Mutation::SetPhaseStatus {
                phase: self.phase,
                status,
                notes: self.notes,
            });
        }
        if let Some(completion) = self.completion {
            mutations.push(Mutation::SetPhaseCompletion {
                phase: self.phase,
                completion,
            });
        }
        if let Some(hours) = self.actual_effort {
            mutations.push(Mutation::SetPhaseEffort {
                phase: self.phase,
                hours,
            });
        }
        if let Some(owner) = self.owner {
            mutations.push(Mutation::SetPhaseOwner {
                phase: self.phase,
                owner,
            });
        }
        mutations
    }
}

/// Status change for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStep {
    pub phase: u32,
    pub step: u32,
    pub status: Status,
}

/// Parameters for completing the in-progress phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompleteCurrent {
    pub notes: Option<String>,
    pub actual_effort: Option<f64>,
}

/// A new execution history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendHistory {
    /// Session context file, relative to the context directory unless absolute
    pub source_ref: String,
    #[serde(default)]
    pub notes: String,
}
