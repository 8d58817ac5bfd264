//! Mutating operations of the lifecycle engine.
//!
//! Each operation is one transaction over one plan file. See the module docs
//! of [`crate::engine`] for the steps every transaction runs.

use std::path::Path;

use super::{LifecycleEngine, Mutation, Outcome};
use crate::{
    error::{LifecycleError, Result},
    models::Status,
    params::{AppendHistory, CompleteCurrent, UpdatePhase, UpdateStep},
    schedule::build_index,
};

impl LifecycleEngine {
    /// Applies several mutations with one load and one save.
    ///
    /// Mutations apply in order; the first failure aborts the whole
    /// transaction and nothing is written.
    ///
    /// # Errors
    ///
    /// * `LifecycleError::InvalidInput` - No mutations were given
    /// * Any error of the individual mutations or of the transaction
    pub fn apply(&self, path: impl AsRef<Path>, mutations: &[Mutation], force: bool) -> Result<Outcome> {
        let path = path.as_ref();
        if mutations.is_empty() {
            return Err(LifecycleError::invalid_input("mutations").with_reason("No updates specified"));
        }
        self.transact(path, |plan, outcome| {
            mutations.iter().try_fold(plan, |plan, mutation| {
                self.apply_mutation(plan, mutation, path, force, outcome)
            })
        })
    }

    /// Starts the next available phase.
    ///
    /// # Errors
    ///
    /// * `LifecycleError::PhaseInProgress` - A phase is already in progress and `force` is unset
    /// * `LifecycleError::NoEligiblePhase` - No not-started phase has its dependencies completed
    pub fn start_next(&self, path: impl AsRef<Path>, force: bool) -> Result<Outcome> {
        self.apply(path, &[Mutation::StartNext], force)
    }

    /// Completes the first in-progress phase, recording notes and effort.
    ///
    /// # Errors
    ///
    /// * `LifecycleError::NoPhaseInProgress` - Nothing is in progress
    pub fn complete_current(&self, path: impl AsRef<Path>, params: &CompleteCurrent) -> Result<Outcome> {
        let mutation = Mutation::CompleteCurrent {
            notes: params.notes.clone(),
            actual_effort: params.actual_effort,
        };
        self.apply(path, &[mutation], false)
    }

    /// Moves phase `phase` to `status`.
    ///
    /// # Errors
    ///
    /// * `LifecycleError::NotFound` - The phase does not exist
    /// * `LifecycleError::IllegalTransition` - The move is not allowed and `force` is unset
    pub fn set_phase_status(
        &self,
        path: impl AsRef<Path>,
        phase: u32,
        status: Status,
        notes: Option<String>,
        force: bool,
    ) -> Result<Outcome> {
        self.apply(
            path,
            &[Mutation::SetPhaseStatus {
                phase,
                status,
                notes,
            }],
            force,
        )
    }

    /// Sets a phase's completion percentage.
    ///
    /// # Errors
    ///
    /// * `LifecycleError::InvalidInput` - Outside 0-100 or contradicting the phase status
    pub fn set_phase_completion(&self, path: impl AsRef<Path>, phase: u32, completion: i64) -> Result<Outcome> {
        self.apply(path, &[Mutation::SetPhaseCompletion { phase, completion }], false)
    }

    /// Records a phase's actual effort in hours.
    pub fn set_phase_effort(&self, path: impl AsRef<Path>, phase: u32, hours: f64) -> Result<Outcome> {
        self.apply(path, &[Mutation::SetPhaseEffort { phase, hours }], false)
    }

    /// Reassigns a phase. The new owner must be in the registry.
    ///
    /// # Errors
    ///
    /// * `LifecycleError::UnknownOwner` - The owner is not known; nothing is written
    pub fn set_phase_owner(&self, path: impl AsRef<Path>, phase: u32, owner: &str) -> Result<Outcome> {
        self.apply(
            path,
            &[Mutation::SetPhaseOwner {
                phase,
                owner: owner.to_string(),
            }],
            false,
        )
    }

    /// Applies every edit of `update` in one transaction.
    pub fn update_phase(&self, path: impl AsRef<Path>, update: UpdatePhase, force: bool) -> Result<Outcome> {
        self.apply(path, &update.into_mutations(), force)
    }

    /// Moves a step to a new status and recomputes the phase completion.
    pub fn set_step_status(&self, path: impl AsRef<Path>, params: &UpdateStep, force: bool) -> Result<Outcome> {
        self.apply(
            path,
            &[Mutation::SetStepStatus {
                phase: params.phase,
                step: params.step,
                status: params.status,
            }],
            force,
        )
    }

    /// Appends an execution history entry.
    ///
    /// # Errors
    ///
    /// * `LifecycleError::NotFound` - The referenced context file does not exist
    pub fn append_history(&self, path: impl AsRef<Path>, params: &AppendHistory) -> Result<Outcome> {
        self.apply(
            path,
            &[Mutation::AppendHistory {
                source_ref: params.source_ref.clone(),
                notes: params.notes.clone(),
            }],
            false,
        )
    }

    /// Archives the plan if every phase is completed. An incomplete plan is
    /// left untouched.
    ///
    /// Unlike the other mutations this accepts a plan that already carries
    /// completion stamps but was never moved into the archive store.
    ///
    /// # Errors
    ///
    /// * `LifecycleError::ArchiveOccupied` - The archive store already holds a plan with this file name
    pub fn archive_if_complete(&self, path: impl AsRef<Path>) -> Result<Outcome> {
        let path = path.as_ref();
        let (plan, snapshot) = self.read(path)?;
        if !plan.all_completed() {
            let done = plan.phases_with(Status::Completed).count();
            return Ok(Outcome {
                messages: vec![format!(
                    "Plan not complete: {done}/{} phases completed",
                    plan.phases.len()
                )],
                index: build_index(&plan.phases),
                ..Outcome::default()
            });
        }
        self.commit(path, plan, &snapshot, |plan, _| Ok(plan))
    }

    /// Replaces the plan with its most recent daily backup.
    ///
    /// # Errors
    ///
    /// * `LifecycleError::BackupUnavailable` - No backup exists
    pub fn restore(&self, path: impl AsRef<Path>) -> Result<Outcome> {
        let used = self.store.restore(path.as_ref())?;
        Ok(Outcome {
            messages: vec![format!("Restored from backup: {}", used.display())],
            ..Outcome::default()
        })
    }
}
