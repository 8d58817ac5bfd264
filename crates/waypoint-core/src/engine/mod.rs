//! Lifecycle facade over plan documents.
//!
//! [`LifecycleEngine`] is the only component that reads and writes plan
//! files. Every mutating operation runs the same transaction:
//!
//! ```text
//! load (snapshot bytes) ─▶ mutate ─▶ recompute index ─▶ structural gate
//!        ─▶ daily backup ─▶ atomic save ─▶ post-write validator ─▶ archive?
//!                                              │
//!                                              └─ blocking: restore snapshot
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for [`LifecycleEngine`] with configuration overrides
//! - [`mutations`]: The [`Mutation`] vocabulary and how each edits a plan
//! - [`handlers`]: Named mutating operations (`start_next`, `complete_current`, ...)
//! - [`queries`]: Read-only operations returning display views
//! - [`outcome`]: The success value of a mutation
//!
//! # Examples
//!
//! ```rust,no_run
//! use waypoint_core::EngineBuilder;
//!
//! # fn example() -> Result<(), waypoint_core::LifecycleError> {
//! let engine = EngineBuilder::new().build()?;
//! let outcome = engine.start_next("Docs/Plans/plan-demo.json", false)?;
//! for message in &outcome.messages {
//!     println!("{message}");
//! }
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;

pub mod builder;
pub mod handlers;
pub mod mutations;
pub mod outcome;
pub mod queries;

#[cfg(test)]
mod tests;

pub use builder::EngineBuilder;
pub use mutations::Mutation;
pub use outcome::Outcome;

use crate::{
    config::{Clock, EngineConfig},
    error::{LifecycleError, Result},
    models::{Effort, Plan},
    schedule::build_index,
    store::{Backup, PersistenceManager},
    transitions::TransitionTable,
    validate::{StructuralValidator, Validator},
};

/// Coordinates loading, mutating, validating and persisting plans.
pub struct LifecycleEngine {
    pub(crate) config: EngineConfig,
    pub(crate) table: TransitionTable,
    pub(crate) store: PersistenceManager,
    pub(crate) gate: StructuralValidator,
    pub(crate) validator: Arc<dyn Validator>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl LifecycleEngine {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &PersistenceManager {
        &self.store
    }

    /// Reads and decodes a plan. Returns the plan and the exact bytes read.
    ///
    /// # Errors
    ///
    /// * `LifecycleError::PlanArchived` - The file is gone but its archive copy exists
    /// * `LifecycleError::NotFound` - The file does not exist
    /// * `LifecycleError::MalformedDocument` - The content is not a plan document
    pub(crate) fn read(&self, path: &Path) -> Result<(Plan, Vec<u8>)> {
        if !path.exists() {
            if self.store.archive_path(path).exists() {
                return Err(LifecycleError::PlanArchived {
                    path: path.to_path_buf(),
                });
            }
            return Err(LifecycleError::not_found(format!(
                "Plan file '{}'",
                path.display()
            )));
        }

        let snapshot = self.store.read(path)?;
        let document: Value =
            serde_json::from_slice(&snapshot).map_err(|e| LifecycleError::MalformedDocument {
                errors: vec![format!("Invalid JSON in plan file: {e}")],
            })?;
        let plan = serde_json::from_value::<Plan>(document.clone()).map_err(|e| {
            let report = self.gate.check(&document);
            let errors = if report.is_blocking() {
                report.blocking_messages()
            } else {
                vec![e.to_string()]
            };
            LifecycleError::MalformedDocument { errors }
        })?;

        debug!("Loaded {} ({} phases)", path.display(), plan.phases.len());
        Ok((plan, snapshot))
    }

    /// Like [`Self::read`], refusing plans carrying archive stamps.
    fn read_mutable(&self, path: &Path) -> Result<(Plan, Vec<u8>)> {
        let (plan, snapshot) = self.read(path)?;
        if plan.metadata.is_archived() {
            return Err(LifecycleError::PlanArchived {
                path: path.to_path_buf(),
            });
        }
        Ok((plan, snapshot))
    }

    /// Runs `mutate` inside the load/validate/save transaction.
    ///
    /// Nothing is written when `mutate` or the structural gate fails. When
    /// the post-write validator blocks, the snapshot is written back and the
    /// call fails with `LifecycleError::RolledBack`.
    pub(crate) fn transact<F>(&self, path: &Path, mutate: F) -> Result<Outcome>
    where
        F: FnOnce(Plan, &mut Outcome) -> Result<Plan>,
    {
        let (plan, snapshot) = self.read_mutable(path)?;
        self.commit(path, plan, &snapshot, mutate)
    }

    /// Mutates an already loaded plan and persists it.
    ///
    /// A plan whose phases are all completed is stamped and written straight
    /// into the archive store; `path` is removed only after that copy passes
    /// validation, so a failed archive leaves `path` byte-identical.
    pub(crate) fn commit<F>(
        &self,
        path: &Path,
        plan: Plan,
        snapshot: &[u8],
        mutate: F,
    ) -> Result<Outcome>
    where
        F: FnOnce(Plan, &mut Outcome) -> Result<Plan>,
    {
        let mut outcome = Outcome::default();
        let mut plan = mutate(plan, &mut outcome)?;

        let index = build_index(&plan.phases);
        plan.phase_index = Some(index.clone());
        plan.metadata.last_updated = Some(self.clock.stamp());

        let archive_to = if plan.all_completed() {
            let dest = self.store.prepare_archive(path)?;
            if plan.metadata.completed_at.is_none() {
                plan.metadata.completed_at = Some(self.clock.stamp());
            }
            plan.metadata.status = Some("completed".to_string());
            plan.metadata.total_actual_effort = Some(Effort::Hours(plan.total_actual_effort()));
            Some(dest)
        } else {
            None
        };

        let document = serde_json::to_value(&plan)?;
        let report = self.gate.check(&document);
        if let Some(err) = report.to_error() {
            debug!("Structural gate rejected {}: {err}", path.display());
            return Err(err);
        }
        for warning in report.warning_messages() {
            outcome.warn_once(warning);
        }

        if self.config.backups {
            self.take_backup(path, &mut outcome);
        }

        let target = match &archive_to {
            Some(dest) => {
                self.store.create_archive_dir(dest)?;
                dest.as_path()
            }
            None => path,
        };
        let content = self.store.save(target, &document)?;

        match self.validator.validate(target, &content) {
            Ok(report) if report.is_blocking() => {
                match &archive_to {
                    Some(dest) => self.store.remove(dest)?,
                    None => self.store.restore_snapshot(path, snapshot)?,
                }
                return Err(LifecycleError::RolledBack {
                    errors: report.blocking_messages(),
                });
            }
            Ok(report) => {
                for warning in report.warning_messages() {
                    outcome.warn_once(warning);
                }
            }
            Err(unavailable) => {
                warn!(
                    "Validator unavailable for {}, accepting write: {unavailable}",
                    target.display()
                );
            }
        }

        if let Some(dest) = archive_to {
            if let Err(err) = self.store.remove(path) {
                self.store.remove(&dest)?;
                return Err(err);
            }
            info!("Archived {} to {}", path.display(), dest.display());
            outcome.note(format!("Plan completed! Archived to: {}", dest.display()));
            outcome.archived_to = Some(dest);
        }

        outcome.index = index;
        Ok(outcome)
    }

    /// A failed backup is reported on the outcome and does not stop the write.
    fn take_backup(&self, path: &Path, outcome: &mut Outcome) {
        match self.store.backup(path, self.clock.today()) {
            Ok(Backup::Created(backup)) => {
                outcome.note(format!("Created backup: {}", file_name(&backup)));
            }
            Ok(Backup::Existing(_)) => {}
            Err(e) => {
                warn!("Backup failed for {}: {e}", path.display());
                outcome.warn_once(format!("Failed to create backup: {e}"));
            }
        }
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
