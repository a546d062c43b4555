// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::RunMode;

/// Command-line arguments for `pipedag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipedag",
    version,
    about = "Run configured pipeline tasks in dependency order.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the project file (TOML).
    ///
    /// Default: `pipedag.toml` in the current working directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPEDAG_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Set up and run the selected tasks.
    Run(QueryArgs),
    /// Set up and compile the selected tasks without side effects.
    Compile(QueryArgs),
    /// Set up the selected tasks and run their checks.
    Test(QueryArgs),
    /// Print the execution order and the selection, run nothing.
    Plan(QueryArgs),
}

impl Command {
    pub fn query(&self) -> &QueryArgs {
        match self {
            Command::Run(q) | Command::Compile(q) | Command::Test(q) | Command::Plan(q) => q,
        }
    }

    /// The run mode, or `None` for `plan`.
    pub fn mode(&self) -> Option<RunMode> {
        match self {
            Command::Run(_) => Some(RunMode::Run),
            Command::Compile(_) => Some(RunMode::Compile),
            Command::Test(_) => Some(RunMode::Test),
            Command::Plan(_) => None,
        }
    }
}

/// Task selection: `name`, `+name`, `name+`, `tag:name`, `group:name`.
#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Select tasks to include (repeatable). Default: every task.
    #[arg(short = 't', long = "tasks", value_name = "SELECTOR")]
    pub tasks: Vec<String>,

    /// Select tasks to leave out (repeatable).
    #[arg(short = 'x', long = "exclude", value_name = "SELECTOR")]
    pub exclude: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
