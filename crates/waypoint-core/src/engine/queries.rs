//! Read-only operations. None of these write to disk.

use std::path::Path;

use log::{debug, warn};

use super::{LifecycleEngine, file_name};
use crate::{
    display::{ActivePlan, ActivePlans, Assignments, PlanSummary, StatusCheck},
    error::{FsResultExt, LifecycleError, Result},
    models::Plan,
    validate::{ValidationReport, Validator},
};

impl LifecycleEngine {
    /// Loads and decodes a plan without touching it.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Plan> {
        self.read(path.as_ref()).map(|(plan, _)| plan)
    }

    /// Full overview of a plan.
    pub fn summary(&self, path: impl AsRef<Path>) -> Result<PlanSummary> {
        let path = path.as_ref();
        Ok(PlanSummary::new(file_name(path), self.load(path)?))
    }

    /// Current, next and blocked phases of a plan.
    pub fn status_check(&self, path: impl AsRef<Path>) -> Result<StatusCheck> {
        let path = path.as_ref();
        Ok(StatusCheck::new(file_name(path), self.load(path)?))
    }

    /// Phases whose owner contains `owner`, ignoring case.
    pub fn assignments_for(&self, path: impl AsRef<Path>, owner: &str) -> Result<Assignments> {
        let path = path.as_ref();
        Ok(Assignments::new(file_name(path), owner, self.load(path)?))
    }

    /// Runs the structural validator over a file as it is on disk.
    ///
    /// Unlike the mutating operations this does not require the content to
    /// decode as a plan: every problem ends up in the report.
    ///
    /// # Errors
    ///
    /// * `LifecycleError::NotFound` - The file does not exist
    pub fn validate(&self, path: impl AsRef<Path>) -> Result<ValidationReport> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LifecycleError::not_found(format!(
                "Plan file '{}'",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path).fs_context(path)?;
        Ok(self.gate.validate(path, &content)?)
    }

    /// Unarchived plans directly inside `dir`, by file name.
    ///
    /// Hidden files, non-JSON files and subdirectories (the backup and
    /// archive stores among them) are skipped. Files that fail to decode are
    /// logged and left out.
    pub fn list_active(&self, dir: impl AsRef<Path>) -> Result<ActivePlans> {
        let dir = dir.as_ref();
        if self.store.is_archive_dir(dir) {
            debug!("{} is the archive store; nothing is active", dir.display());
            return Ok(ActivePlans::default());
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .fs_context(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_plan_file(p))
            .collect();
        paths.sort();

        let mut active = Vec::new();
        for path in paths {
            match self.read(&path) {
                Ok((plan, _)) if plan.metadata.is_archived() => {
                    debug!("Skipping completed plan {}", path.display());
                }
                Ok((plan, _)) => active.push(ActivePlan {
                    name: file_name(&path),
                    plan,
                }),
                Err(e) => warn!("Skipping {}: {e}", path.display()),
            }
        }
        Ok(ActivePlans(active))
    }
}

fn is_plan_file(path: &Path) -> bool {
    let visible = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| !n.starts_with('.'));
    visible && path.extension().is_some_and(|ext| ext == "json")
}
