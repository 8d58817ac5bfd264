//! Mutation vocabulary and how each one edits a plan.

use std::path::{Path, PathBuf};

use log::debug;

use super::{LifecycleEngine, Outcome};
use crate::{
    error::{LifecycleError, Result},
    models::{Effort, HistoryEntry, Phase, Plan, Status},
    operations,
    schedule::{blocked_candidates, build_index},
    store::parent_dir,
};

/// One edit to a plan document.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Move the next available phase to `in_progress`
    StartNext,

    /// Complete the first in-progress phase
    CompleteCurrent {
        notes: Option<String>,
        actual_effort: Option<f64>,
    },

    SetPhaseStatus {
        phase: u32,
        status: Status,
        /// Recorded as `completion_notes` when the new status is `completed`
        notes: Option<String>,
    },

    SetPhaseCompletion { phase: u32, completion: i64 },

    SetPhaseEffort { phase: u32, hours: f64 },

    SetPhaseOwner { phase: u32, owner: String },

    SetStepStatus { phase: u32, step: u32, status: Status },

    AppendHistory { source_ref: String, notes: String },
}

impl LifecycleEngine {
    /// Applies one mutation to an owned plan.
    pub(crate) fn apply_mutation(
        &self,
        plan: Plan,
        mutation: &Mutation,
        path: &Path,
        force: bool,
        outcome: &mut Outcome,
    ) -> Result<Plan> {
        debug!("Applying {mutation:?}");
        match mutation {
            Mutation::StartNext => self.start_next_phase(plan, force, outcome),
            Mutation::CompleteCurrent {
                notes,
                actual_effort,
            } => self.complete_current_phase(plan, notes.as_deref(), *actual_effort, outcome),
            Mutation::SetPhaseStatus {
                phase,
                status,
                notes,
            } => self.set_status(plan, *phase, *status, notes.as_deref(), force, outcome),
            Mutation::SetPhaseCompletion { phase, completion } => {
                set_completion(plan, *phase, *completion, outcome)
            }
            Mutation::SetPhaseEffort { phase, hours } => set_effort(plan, *phase, *hours, outcome),
            Mutation::SetPhaseOwner { phase, owner } => set_owner(plan, *phase, owner, outcome),
            Mutation::SetStepStatus {
                phase,
                step,
                status,
            } => self.set_step(plan, *phase, *step, *status, force, outcome),
            Mutation::AppendHistory { source_ref, notes } => {
                self.append_history_entry(plan, path, source_ref, notes, outcome)
            }
        }
    }

    fn start_next_phase(&self, plan: Plan, force: bool, outcome: &mut Outcome) -> Result<Plan> {
        if let Some(current) = plan.current_phase() {
            if !force {
                return Err(LifecycleError::PhaseInProgress {
                    phase: current.number,
                });
            }
            outcome.note(format!(
                "Phase {} is still in_progress (forced)",
                current.number
            ));
        }

        let Some(next) = build_index(&plan.phases).next_available else {
            return Err(LifecycleError::NoEligiblePhase {
                blocked: blocked_candidates(&plan.phases),
            });
        };

        update_phase(plan, next, |phase| {
            let (phase, _) = self.table.transition_phase(phase, Status::InProgress, force)?;
            outcome.note(format!("Started Phase {}: {}", phase.number, phase.name()));
            outcome.note(format!("Assigned to: {}", phase.owner()));
            Ok(phase)
        })
    }

    fn complete_current_phase(
        &self,
        plan: Plan,
        notes: Option<&str>,
        actual_effort: Option<f64>,
        outcome: &mut Outcome,
    ) -> Result<Plan> {
        let actual_effort = actual_effort.map(operations::validate_effort).transpose()?;
        let current = plan
            .current_phase()
            .map(|p| p.number)
            .ok_or(LifecycleError::NoPhaseInProgress)?;

        update_phase(plan, current, |phase| {
            let (mut phase, _) = self.table.transition_phase(phase, Status::Completed, false)?;
            if let Some(notes) = notes {
                phase.completion_notes = Some(notes.to_string());
                outcome.note("Added completion notes");
            }
            if let Some(hours) = actual_effort {
                phase.actual_effort = Some(Effort::Hours(hours));
                outcome.note(format!("Recorded actual effort: {hours}h"));
            }
            outcome.note(format!("Completed Phase {}: {}", phase.number, phase.name()));
            Ok(phase)
        })
    }

    fn set_status(
        &self,
        plan: Plan,
        number: u32,
        status: Status,
        notes: Option<&str>,
        force: bool,
        outcome: &mut Outcome,
    ) -> Result<Plan> {
        update_phase(plan, number, |phase| {
            let before = phase.completion();
            let (mut phase, transition) = self.table.transition_phase(phase, status, force)?;
            if status == Status::Completed {
                if let Some(notes) = notes {
                    phase.completion_notes = Some(notes.to_string());
                    outcome.note("Added completion notes");
                }
            }
            if phase.completion() != before {
                outcome.note(format!(
                    "Auto-set completion to {}% (status = {status})",
                    phase.completion()
                ));
            }
            outcome.note(format!(
                "Updated Phase {number} status: {} → {}{}",
                transition.from,
                transition.to,
                if transition.forced { " (forced)" } else { "" }
            ));
            Ok(phase)
        })
    }

    fn set_step(
        &self,
        plan: Plan,
        number: u32,
        step: u32,
        status: Status,
        force: bool,
        outcome: &mut Outcome,
    ) -> Result<Plan> {
        update_phase(plan, number, |phase| {
            let before = phase.completion();
            let (phase, transition) = self.table.transition_step(phase, step, status, force)?;
            outcome.note(format!(
                "Updated Phase {number}, Step {step} status: {} → {}",
                transition.from, transition.to
            ));
            if phase.completion() != before {
                outcome.note(format!(
                    "Auto-updated Phase {number} completion: {before}% → {}% ({}/{} steps)",
                    phase.completion(),
                    phase.completed_steps(),
                    phase.steps().len()
                ));
            }
            Ok(phase)
        })
    }

    fn append_history_entry(
        &self,
        mut plan: Plan,
        path: &Path,
        source_ref: &str,
        notes: &str,
        outcome: &mut Outcome,
    ) -> Result<Plan> {
        let source = self.resolve_context(path, source_ref);
        if !source.exists() {
            return Err(LifecycleError::not_found(format!(
                "Context file '{source_ref}'"
            )));
        }
        let context_file = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_ref.to_string());

        let index = build_index(&plan.phases);
        let entry = HistoryEntry {
            date: Some(self.clock.today().to_string()),
            context_file: Some(context_file.clone()),
            notes: Some(notes.to_string()),
            phases_completed: index.completed,
            phases_in_progress: index.in_progress,
            ..HistoryEntry::default()
        };
        plan.execution_history.get_or_insert_with(Vec::new).push(entry);
        outcome.note(format!(
            "Added execution history entry (context: {context_file})"
        ));
        Ok(plan)
    }

    /// Absolute references are used as given; relative ones resolve under
    /// the configured context directory, else `<plan dir>/../Context`.
    pub(crate) fn resolve_context(&self, path: &Path, source_ref: &str) -> PathBuf {
        let reference = Path::new(source_ref);
        if reference.is_absolute() {
            return reference.to_path_buf();
        }
        let base = match &self.config.context_dir {
            Some(dir) => dir.clone(),
            None => parent_dir(path).join("..").join("Context"),
        };
        base.join(reference)
    }
}

fn set_completion(plan: Plan, number: u32, completion: i64, outcome: &mut Outcome) -> Result<Plan> {
    let completion = operations::validate_completion(completion)?;
    update_phase(plan, number, |mut phase| {
        operations::check_completion_agrees(&phase, completion)?;
        let before = phase.completion();
        phase.completion_percentage = Some(completion);
        outcome.note(format!(
            "Updated Phase {number} completion: {before}% → {completion}%"
        ));
        Ok(phase)
    })
}

fn set_effort(plan: Plan, number: u32, hours: f64, outcome: &mut Outcome) -> Result<Plan> {
    let hours = operations::validate_effort(hours)?;
    update_phase(plan, number, |mut phase| {
        let message = match phase.actual_effort.as_ref().and_then(Effort::hours) {
            Some(before) => format!("Updated Phase {number} actual effort: {before}h → {hours}h"),
            None => format!("Set Phase {number} actual effort: {hours}h"),
        };
        phase.actual_effort = Some(Effort::Hours(hours));
        outcome.note(message);
        Ok(phase)
    })
}

fn set_owner(plan: Plan, number: u32, owner: &str, outcome: &mut Outcome) -> Result<Plan> {
    let owner = operations::validate_owner(owner)?;
    update_phase(plan, number, |mut phase| {
        outcome.note(format!(
            "Reassigned Phase {number}: {} → {owner}",
            phase.owner()
        ));
        phase.assigned_subagent = Some(owner.to_string());
        Ok(phase)
    })
}

/// Replaces phase `number` with the result of `edit`.
fn update_phase<F>(mut plan: Plan, number: u32, edit: F) -> Result<Plan>
where
    F: FnOnce(Phase) -> Result<Phase>,
{
    let total = plan.phases.len();
    let position = plan
        .phases
        .iter()
        .position(|p| p.number == number)
        .ok_or_else(|| {
            LifecycleError::not_found(format!("Phase {number} (plan has {total} phases)"))
        })?;
    let phase = plan.phases[position].clone();
    plan.phases[position] = edit(phase)?;
    Ok(plan)
}
