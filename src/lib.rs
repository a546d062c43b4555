// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod query;
pub mod task;
pub mod types;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, resolve_tasks};
use crate::engine::{ExecutionPlan, Orchestrator, RunContext, RunReport};
use crate::task::TaskSet;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - project loading and preset resolution
/// - graph validation and the task query
/// - the orchestrator, with the built-in runners
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<i32> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let project = load_and_validate(&config_path)
        .with_context(|| format!("loading project {config_path:?}"))?;
    let tasks = resolve_tasks(&project)?;

    let query = args.command.query();

    let Some(mode) = args.command.mode() else {
        let plan = ExecutionPlan::build(&tasks, &query.tasks, &query.exclude)?;
        print_plan(&tasks, &plan);
        return Ok(0);
    };

    let cancel = CancellationToken::new();

    // Ctrl-C → stop starting new tasks.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            warn!("Ctrl+C received; finishing the current stage");
            cancel.cancel();
        });
    }

    let ctx = RunContext::new(mode).with_cancel(cancel);
    let report = Orchestrator::new(&ctx)
        .run(&tasks, &query.tasks, &query.exclude)
        .await?;

    print_summary(&report);
    Ok(report.exit_code())
}

/// `plan` output: one line per task in execution order.
fn print_plan(tasks: &TaskSet, plan: &ExecutionPlan) {
    println!("pipedag plan");
    println!(
        "  {} task(s), {} selected",
        plan.order().len(),
        plan.selected().len()
    );
    println!();

    for entry in plan.entries() {
        let marker = if entry.in_query { '*' } else { ' ' };
        let task_type = tasks
            .get(&entry.name)
            .map(|t| t.task_type.as_str())
            .unwrap_or("?");
        println!("{marker} [{}] {} ({task_type})", entry.layer, entry.name);
        if !entry.parents.is_empty() {
            println!("      parents: {}", entry.parents.join(", "));
        }
    }

    debug!("plan complete (no execution)");
}

fn print_summary(report: &RunReport) {
    info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        not_in_query = report.not_in_query.len(),
        "summary"
    );

    for err in &report.errors {
        eprintln!("  failed: {err}");
    }
    if !report.skipped.is_empty() {
        eprintln!("  skipped: {}", report.skipped.join(", "));
    }
    if report.interrupted {
        eprintln!("  run was interrupted");
    }
}
