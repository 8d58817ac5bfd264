//! Command argument definitions and their handlers.
//!
//! Argument structs carry clap derives and convert into the core parameter
//! types, so the core stays free of CLI framework concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → LifecycleEngine
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use log::debug;
use waypoint_core::{
    AppendHistory, CompleteCurrent, LifecycleEngine, Outcome, OutcomeView, ReportView, Status,
    UpdatePhase, UpdateStep,
};

use crate::{args::Commands, renderer::TerminalRenderer};

/// A plan file operated on by a command
#[derive(Args)]
pub struct PlanArg {
    /// Path to the plan JSON file
    pub plan: PathBuf,
}

/// Complete the phase currently in progress
#[derive(Args)]
pub struct CompleteArgs {
    /// Path to the plan JSON file
    pub plan: PathBuf,
    /// What was accomplished, stored as the phase's completion notes
    #[arg(short, long)]
    pub notes: Option<String>,
    /// Hours actually spent on the phase
    #[arg(short = 'e', long)]
    pub actual_effort: Option<f64>,
}

impl From<CompleteArgs> for CompleteCurrent {
    fn from(val: CompleteArgs) -> Self {
        CompleteCurrent {
            notes: val.notes,
            actual_effort: val.actual_effort,
        }
    }
}

/// Update one phase
///
/// Every given flag is applied in a single load and save; if any edit is
/// rejected, none of them are written.
#[derive(Args)]
pub struct PhaseArgs {
    /// Path to the plan JSON file
    pub plan: PathBuf,
    /// Phase number
    pub phase: u32,
    #[arg(short, long, help = "New status for the phase")]
    pub status: Option<StatusArg>,
    #[arg(short, long, help = "Completion percentage (0-100)")]
    pub completion: Option<i64>,
    #[arg(short = 'e', long, help = "Hours actually spent on the phase")]
    pub actual_effort: Option<f64>,
    #[arg(short, long, help = "New owner, which must be a known agent or 'human'")]
    pub owner: Option<String>,
    #[arg(
        short,
        long,
        help = "Completion notes, recorded when the status becomes 'completed'"
    )]
    pub notes: Option<String>,
}

impl From<PhaseArgs> for UpdatePhase {
    fn from(val: PhaseArgs) -> Self {
        UpdatePhase {
            phase: val.phase,
            status: val.status.map(Status::from),
            completion: val.completion,
            actual_effort: val.actual_effort,
            owner: val.owner,
            notes: val.notes,
        }
    }
}

/// Update a step's status
///
/// The owning phase's completion percentage is recomputed from its steps.
#[derive(Args)]
pub struct StepArgs {
    /// Path to the plan JSON file
    pub plan: PathBuf,
    /// Phase number
    pub phase: u32,
    /// Step number within the phase
    pub step: u32,
    /// New status for the step
    pub status: StatusArg,
}

impl From<StepArgs> for UpdateStep {
    fn from(val: StepArgs) -> Self {
        UpdateStep {
            phase: val.phase,
            step: val.step,
            status: val.status.into(),
        }
    }
}

/// Append an execution history entry
#[derive(Args)]
pub struct HistoryArgs {
    /// Path to the plan JSON file
    pub plan: PathBuf,
    /// Context file, relative to the context directory unless absolute
    pub context: String,
    /// Summary of the session
    pub notes: String,
}

impl From<HistoryArgs> for AppendHistory {
    fn from(val: HistoryArgs) -> Self {
        AppendHistory {
            source_ref: val.context,
            notes: val.notes,
        }
    }
}

/// Show phases assigned to an owner
#[derive(Args)]
pub struct AssignmentsArgs {
    /// Path to the plan JSON file
    pub plan: PathBuf,
    /// Owner name; partial and case-insensitive
    pub owner: String,
}

/// List active plans
#[derive(Args)]
pub struct ListArgs {
    /// Directory containing plan files
    #[arg(default_value = "Docs/Plans")]
    pub dir: PathBuf,
}

/// Command-line representation of phase and step statuses
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum StatusArg {
    NotStarted,
    InProgress,
    Completed,
    Blocked,
}

impl From<StatusArg> for Status {
    fn from(val: StatusArg) -> Self {
        match val {
            StatusArg::NotStarted => Status::NotStarted,
            StatusArg::InProgress => Status::InProgress,
            StatusArg::Completed => Status::Completed,
            StatusArg::Blocked => Status::Blocked,
        }
    }
}

/// Dispatches parsed commands to the engine and renders the results.
pub struct Cli {
    engine: LifecycleEngine,
    renderer: TerminalRenderer,
    force: bool,
}

impl Cli {
    pub fn new(engine: LifecycleEngine, renderer: TerminalRenderer, force: bool) -> Self {
        Self {
            engine,
            renderer,
            force,
        }
    }

    /// Runs `command` and returns the process exit status.
    pub fn run(&self, command: Commands) -> Result<u8> {
        let force = self.force;
        match command {
            Commands::StartNext(args) => self.applied(&self.engine.start_next(&args.plan, force)?),
            Commands::Complete(args) => {
                let plan = args.plan.clone();
                self.applied(&self.engine.complete_current(&plan, &args.into())?)
            }
            Commands::Phase(args) => {
                let plan = args.plan.clone();
                self.applied(&self.engine.update_phase(&plan, args.into(), force)?)
            }
            Commands::Step(args) => {
                let plan = args.plan.clone();
                self.applied(&self.engine.set_step_status(&plan, &args.into(), force)?)
            }
            Commands::History(args) => {
                let plan = args.plan.clone();
                self.applied(&self.engine.append_history(&plan, &args.into())?)
            }
            Commands::Archive(args) => self.applied(&self.engine.archive_if_complete(&args.plan)?),
            Commands::Restore(args) => self.applied(&self.engine.restore(&args.plan)?),
            Commands::Summary(args) => {
                self.renderer.render(&self.engine.summary(&args.plan)?.to_string())?;
                Ok(0)
            }
            Commands::Status(args) => {
                self.renderer
                    .render(&self.engine.status_check(&args.plan)?.to_string())?;
                Ok(0)
            }
            Commands::Assignments(args) => {
                let view = self.engine.assignments_for(&args.plan, &args.owner)?;
                self.renderer.render(&view.to_string())?;
                Ok(0)
            }
            Commands::Validate(args) => {
                let report = self.engine.validate(&args.plan)?;
                let name = args.plan.display().to_string();
                self.renderer
                    .render(&ReportView::new(&name, &report).to_string())?;
                Ok(report.exit_code())
            }
            Commands::List(args) => {
                let active = self.engine.list_active(&args.dir)?;
                self.renderer.render(&active.to_string())?;
                Ok(if active.needs_attention() { 1 } else { 0 })
            }
        }
    }

    fn applied(&self, outcome: &Outcome) -> Result<u8> {
        debug!("Outcome index: {:?}", outcome.index);
        self.renderer.render(&OutcomeView(outcome).to_string())?;
        Ok(outcome.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::args::Args;

    #[test]
    fn test_phase_args_convert_to_update() {
        let Args { command, .. } = Args::parse_from([
            "wp",
            "phase",
            "plan.json",
            "2",
            "--status",
            "completed",
            "--actual-effort",
            "3.5",
        ]);
        let Commands::Phase(args) = command else {
            panic!("expected phase command");
        };
        let update = UpdatePhase::from(args);
        assert_eq!(update.phase, 2);
        assert_eq!(update.status, Some(Status::Completed));
        assert_eq!(update.actual_effort, Some(3.5));
        assert!(update.owner.is_none());
    }

    #[test]
    fn test_status_values_use_document_spelling() {
        let Args { command, force, .. } =
            Args::parse_from(["wp", "--force", "step", "plan.json", "1", "2", "not_started"]);
        let Commands::Step(args) = command else {
            panic!("expected step command");
        };
        assert!(force);
        assert_eq!(UpdateStep::from(args).status, Status::NotStarted);
    }

    #[test]
    fn test_list_defaults_to_plans_directory() {
        let Args { command, .. } = Args::parse_from(["wp", "list"]);
        let Commands::List(args) = command else {
            panic!("expected list command");
        };
        assert_eq!(args.dir, PathBuf::from("Docs/Plans"));
    }
}
