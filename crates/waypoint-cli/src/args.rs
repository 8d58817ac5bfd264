use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{
    AssignmentsArgs, CompleteArgs, HistoryArgs, ListArgs, PhaseArgs, PlanArg, StepArgs,
};

/// Lifecycle tool for multi-phase JSON work plans
///
/// Waypoint moves phases and steps of a plan document through their status
/// state machine, keeps the scheduling index current, validates every write
/// and archives plans once every phase is completed.
#[derive(Parser)]
#[command(version, about, name = "wp")]
pub struct Args {
    /// Configuration file. Defaults to $XDG_CONFIG_HOME/waypoint/config.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Agent index markdown whose table rows name the known owners
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Skip the daily backup before writing
    #[arg(long, global = true)]
    pub no_backup: bool,

    /// Accept status changes outside the transition table
    #[arg(long, global = true)]
    pub force: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the Waypoint CLI
///
/// Mutating commands exit 0 when applied cleanly, 1 when applied with
/// warnings and 2 when rejected with the document unchanged.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the next phase whose dependencies are completed
    #[command(alias = "next")]
    StartNext(PlanArg),
    /// Complete the phase currently in progress
    #[command(alias = "done")]
    Complete(CompleteArgs),
    /// Update a phase's status, completion, effort or owner in one write
    #[command(alias = "p")]
    Phase(PhaseArgs),
    /// Update a step's status
    #[command(alias = "s")]
    Step(StepArgs),
    /// Append an execution history entry
    History(HistoryArgs),
    /// Archive the plan if every phase is completed
    Archive(PlanArg),
    /// Show the full plan overview
    Summary(PlanArg),
    /// Show current, next and blocked phases
    #[command(alias = "st")]
    Status(PlanArg),
    /// Show phases assigned to an owner
    Assignments(AssignmentsArgs),
    /// Validate a plan file without changing it
    Validate(PlanArg),
    /// Restore the plan from its latest daily backup
    Restore(PlanArg),
    /// List active plans in a directory
    #[command(alias = "ls")]
    List(ListArgs),
}
