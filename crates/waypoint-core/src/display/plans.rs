//! Read-only plan views.
//!
//! Each view owns the plan it renders, so the engine can hand it out after
//! the document is closed.

use std::fmt;

use super::datetime::Stamp;
use crate::{
    models::{Phase, Plan, Status},
    schedule::unmet_dependencies,
};

fn blocked_by(plan: &Plan, phase: &Phase) -> Vec<String> {
    unmet_dependencies(&plan.phases, phase)
        .iter()
        .map(|dep| format!("Phase {} ({})", dep.number, dep.status()))
        .collect()
}

fn write_header(f: &mut fmt::Formatter<'_>, name: &str, plan: &Plan) -> fmt::Result {
    writeln!(f, "# Plan: {name}")?;
    writeln!(f)?;
    writeln!(f, "- Goal: {}", plan.planning().goal())?;
    Ok(())
}

/// Full plan overview: every phase and the execution history.
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub name: String,
    pub plan: Plan,
}

impl PlanSummary {
    pub fn new(name: impl Into<String>, plan: Plan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = &self.plan;
        let planning = plan.planning();
        write_header(f, &self.name, plan)?;
        writeln!(
            f,
            "- Priority: {} | Timeline: {} | Phases: {}",
            planning.priority(),
            planning.timeline(),
            plan.phases.len()
        )?;
        if let Some(updated) = &plan.metadata.last_updated {
            writeln!(f, "- Last updated: {}", Stamp(updated))?;
        }
        writeln!(f)?;

        for phase in &plan.phases {
            write!(f, "{phase}")?;
        }

        if !plan.history().is_empty() {
            writeln!(f, "## Execution History")?;
            writeln!(f)?;
            for entry in plan.history() {
                write!(f, "{entry}")?;
            }
        }
        Ok(())
    }
}

/// Current work, next candidates and blocked phases.
#[derive(Debug, Clone)]
pub struct StatusCheck {
    pub name: String,
    pub plan: Plan,
}

impl StatusCheck {
    /// Not-started phases shown under "Next Available".
    const NEXT_SHOWN: usize = 3;

    pub fn new(name: impl Into<String>, plan: Plan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

impl fmt::Display for StatusCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = &self.plan;
        write_header(f, &self.name, plan)?;
        writeln!(
            f,
            "- Status: {}/{} phases completed",
            plan.phases_with(Status::Completed).count(),
            plan.phases.len()
        )?;

        let current = plan.current_phase();
        if let Some(phase) = current {
            writeln!(f)?;
            writeln!(f, "## Currently In Progress")?;
            writeln!(f)?;
            writeln!(f, "- Phase {}: {}", phase.number, phase.name())?;
            writeln!(f, "- Assigned: {}", phase.owner())?;
            writeln!(f, "- Completion: {}%", phase.completion())?;
            writeln!(
                f,
                "- Steps: {}/{} completed",
                phase.completed_steps(),
                phase.steps().len()
            )?;
        }

        let mut ready = None;
        let not_started: Vec<&Phase> = plan.phases_with(Status::NotStarted).collect();
        if !not_started.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Next Available")?;
            writeln!(f)?;
            for phase in not_started.iter().take(Self::NEXT_SHOWN) {
                let blocking = blocked_by(plan, phase);
                if blocking.is_empty() {
                    writeln!(f, "- → Phase {}: {} [{}]", phase.number, phase.name(), phase.owner())?;
                } else {
                    writeln!(
                        f,
                        "- ⊘ Phase {}: {} [{}], blocked by: {}",
                        phase.number,
                        phase.name(),
                        phase.owner(),
                        blocking.join(", ")
                    )?;
                }
            }
            ready = not_started
                .iter()
                .find(|p| blocked_by(plan, p).is_empty())
                .map(|p| p.number);
        }

        let blocked: Vec<&Phase> = plan.phases_with(Status::Blocked).collect();
        if !blocked.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Blocked")?;
            writeln!(f)?;
            for phase in blocked {
                writeln!(f, "- {} Phase {}: {}", Status::Blocked.icon(), phase.number, phase.name())?;
                for blocker in phase.blockers().iter().take(2) {
                    writeln!(
                        f,
                        "  - {}",
                        blocker.issue.as_deref().unwrap_or("Unknown issue")
                    )?;
                }
            }
        }

        if current.is_some() || ready.is_some() {
            writeln!(f)?;
            writeln!(f, "## Quick Commands")?;
            writeln!(f)?;
            if let Some(phase) = current {
                writeln!(f, "- `wp complete`: complete Phase {}", phase.number)?;
            }
            if let Some(number) = ready {
                writeln!(f, "- `wp start-next`: start Phase {number}")?;
            }
        }
        Ok(())
    }
}

/// Phases whose owner matches a name, case-insensitively and by substring.
#[derive(Debug, Clone)]
pub struct Assignments {
    pub name: String,
    pub owner: String,
    pub plan: Plan,
}

impl Assignments {
    pub fn new(name: impl Into<String>, owner: impl Into<String>, plan: Plan) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            plan,
        }
    }

    pub fn phases(&self) -> Vec<&Phase> {
        let needle = self.owner.to_lowercase();
        self.plan
            .phases
            .iter()
            .filter(|p| {
                p.assigned_subagent
                    .as_deref()
                    .is_some_and(|owner| owner.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

impl fmt::Display for Assignments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mine = self.phases();
        if mine.is_empty() {
            writeln!(f, "No phases assigned to '{}'", self.owner)?;
            let mut owners: Vec<&str> = self.plan.phases.iter().map(Phase::owner).collect();
            owners.sort_unstable();
            owners.dedup();
            writeln!(f)?;
            writeln!(f, "Available assignments: {}", owners.join(", "))?;
            return Ok(());
        }

        write_header(f, &self.name, &self.plan)?;
        writeln!(f)?;
        writeln!(f, "## Assignments for {}", self.owner)?;
        for phase in mine {
            writeln!(f)?;
            writeln!(
                f,
                "### {} Phase {}: {}",
                phase.status().icon(),
                phase.number,
                phase.name()
            )?;
            writeln!(f)?;
            writeln!(
                f,
                "- Status: {} | Completion: {}%",
                phase.status(),
                phase.completion()
            )?;
            if phase.status() == Status::NotStarted {
                let blocking = blocked_by(&self.plan, phase);
                if blocking.is_empty() {
                    writeln!(f, "- Ready to start")?;
                } else {
                    writeln!(f, "- Blocked by: {}", blocking.join(", "))?;
                }
            }
            if !phase.steps().is_empty() {
                writeln!(f, "- Steps: {}/{}", phase.completed_steps(), phase.steps().len())?;
            }
        }
        Ok(())
    }
}

/// An unarchived plan found by a directory scan.
#[derive(Debug, Clone)]
pub struct ActivePlan {
    pub name: String,
    pub plan: Plan,
}

impl ActivePlan {
    /// In-progress phases left open.
    pub fn needs_attention(&self) -> bool {
        self.plan.current_phase().is_some()
    }
}

/// Active plans in a directory.
#[derive(Debug, Clone, Default)]
pub struct ActivePlans(pub Vec<ActivePlan>);

impl ActivePlans {
    pub fn needs_attention(&self) -> bool {
        self.0.iter().any(ActivePlan::needs_attention)
    }
}

impl fmt::Display for ActivePlans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Active Plans")?;
        writeln!(f)?;
        if self.0.is_empty() {
            writeln!(f, "No active plans found.")?;
            return Ok(());
        }

        for active in &self.0 {
            let plan = &active.plan;
            writeln!(f, "## {}", active.name)?;
            writeln!(f)?;
            writeln!(f, "- Goal: {}", plan.planning().goal())?;
            writeln!(
                f,
                "- Progress: {}/{} phases completed",
                plan.phases_with(Status::Completed).count(),
                plan.phases.len()
            )?;
            for phase in plan.phases_with(Status::InProgress) {
                writeln!(
                    f,
                    "- {} Phase {}: {} ({}% complete)",
                    Status::InProgress.icon(),
                    phase.number,
                    phase.name(),
                    phase.completion()
                )?;
            }
            for phase in plan.phases_with(Status::Blocked) {
                writeln!(f, "- {} Phase {}: {}", Status::Blocked.icon(), phase.number, phase.name())?;
            }
            writeln!(f)?;
        }

        if self.needs_attention() {
            writeln!(
                f,
                "Phases are still in_progress. Complete them or mark them blocked before ending the session."
            )?;
        }
        Ok(())
    }
}
