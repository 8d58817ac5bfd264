//! Waypoint CLI Application
//!
//! Command-line interface for the waypoint plan lifecycle tool.

mod args;
mod cli;
mod renderer;

use std::process::ExitCode;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use waypoint_core::{EngineBuilder, EngineConfig, OperationStatus};

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprint!("{}", OperationStatus::failure(format!("{err:#}")));
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<u8> {
    let Args {
        config,
        registry,
        no_color,
        no_backup,
        force,
        command,
    } = Args::parse();

    let mut config =
        EngineConfig::discover(config.as_deref()).context("Failed to load configuration")?;
    if registry.is_some() {
        config.agent_index = registry;
    }

    let mut builder = EngineBuilder::new().with_config(config);
    if no_backup {
        builder = builder.with_backups(false);
    }
    let engine = builder.build().context("Failed to initialize engine")?;

    info!("Waypoint started");
    Cli::new(engine, TerminalRenderer::new(!no_color), force).run(command)
}
