//! Status state machine for phases and steps.
//!
//! The legal moves between statuses come from a [`TransitionTable`] chosen
//! through [`TransitionPolicy`]. Phases and steps share the same table.
//!
//! ```text
//! permissive                          strict
//! not_started → in_progress           not_started → in_progress
//! not_started → blocked               not_started → blocked
//! not_started → completed             in_progress → completed
//! in_progress → completed             in_progress → blocked
//! in_progress → blocked               blocked     → in_progress
//! blocked     → in_progress
//! blocked     → completed
//! ```
//!
//! `completed` has no outbound transitions in either table; only a forced
//! transition can leave it.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{LifecycleError, Result},
    models::{Phase, Status},
};

/// Named transition table selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Allows retroactive completion and completing blocked work
    #[default]
    Permissive,

    /// Work must pass through `in_progress` before it can complete
    Strict,
}

impl TransitionPolicy {
    pub fn table(self) -> TransitionTable {
        match self {
            TransitionPolicy::Permissive => TransitionTable::permissive(),
            TransitionPolicy::Strict => TransitionTable::strict(),
        }
    }
}

/// The result of an accepted status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Status,
    pub to: Status,

    /// Completion percentage implied by the new status, if any
    pub completion: Option<i64>,

    /// Whether the move was outside the table and accepted only by force
    pub forced: bool,
}

impl Transition {
    /// True when the status does not actually change.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Allowed target statuses per current status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    allowed: HashMap<Status, Vec<Status>>,
}

impl TransitionTable {
    /// Builds a table from explicit rows. Statuses without a row are terminal.
    pub fn from_rows(rows: impl IntoIterator<Item = (Status, Vec<Status>)>) -> Self {
        Self {
            allowed: rows.into_iter().collect(),
        }
    }

    pub fn permissive() -> Self {
        use Status::*;
        Self::from_rows([
            (NotStarted, vec![InProgress, Blocked, Completed]),
            (InProgress, vec![Completed, Blocked]),
            (Blocked, vec![InProgress, Completed]),
            (Completed, vec![]),
        ])
    }

    pub fn strict() -> Self {
        use Status::*;
        Self::from_rows([
            (NotStarted, vec![InProgress, Blocked]),
            (InProgress, vec![Completed, Blocked]),
            (Blocked, vec![InProgress]),
            (Completed, vec![]),
        ])
    }

    pub fn allowed_from(&self, from: Status) -> &[Status] {
        self.allowed.get(&from).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_allowed(&self, from: Status, to: Status) -> bool {
        from == to || self.allowed_from(from).contains(&to)
    }

    /// Validates `from → to` for `subject` (used in the error message).
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::IllegalTransition` when the move is not in
    /// the table and `force` is not set.
    pub fn apply(&self, subject: &str, from: Status, to: Status, force: bool) -> Result<Transition> {
        let allowed = self.is_allowed(from, to);
        if !allowed && !force {
            return Err(LifecycleError::IllegalTransition {
                subject: subject.to_string(),
                from,
                to,
                allowed: self.allowed_from(from).to_vec(),
            });
        }

        let completion = match to {
            Status::Completed => Some(100),
            Status::NotStarted => Some(0),
            _ => None,
        };
        if !allowed {
            debug!("{subject}: forced transition {from} -> {to}");
        }

        Ok(Transition {
            from,
            to,
            completion,
            forced: !allowed,
        })
    }

    /// Moves a phase to `to`, applying the completion side effect.
    pub fn transition_phase(&self, mut phase: Phase, to: Status, force: bool) -> Result<(Phase, Transition)> {
        let subject = format!("Phase {}", phase.number);
        let transition = self.apply(&subject, phase.status(), to, force)?;
        phase.status = Some(to);
        if let Some(pct) = transition.completion {
            phase.completion_percentage = Some(pct);
        }
        Ok((phase, transition))
    }

    /// Moves step `step` of `phase` to `to` and recomputes the phase's
    /// completion from its steps.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::NotFound` if the step does not exist, or
    /// `LifecycleError::IllegalTransition` as for [`Self::apply`].
    pub fn transition_step(
        &self,
        mut phase: Phase,
        step: u32,
        to: Status,
        force: bool,
    ) -> Result<(Phase, Transition)> {
        let subject = format!("Phase {}, Step {step}", phase.number);
        let phase_number = phase.number;
        let target = phase
            .steps
            .as_mut()
            .and_then(|steps| steps.iter_mut().find(|s| s.number == step))
            .ok_or_else(|| {
                LifecycleError::not_found(format!("Step {step} in Phase {phase_number}"))
            })?;

        let transition = self.apply(&subject, target.status(), to, force)?;
        target.status = Some(to);

        if let Some(pct) = phase.step_completion() {
            phase.completion_percentage = Some(pct);
        }
        Ok((phase, transition))
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::permissive()
    }
}
