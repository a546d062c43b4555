// src/exec/runner.rs

//! The capability set every task type implements.

use std::future::Future;
use std::pin::Pin;

use crate::task::TaskDescriptor;

/// Result of a runner stage. Runners report failures with `anyhow`; the task
/// wrapper turns them into [`crate::errors::TaskError`]s.
pub type RunnerResult = anyhow::Result<()>;

/// Boxed future returned by the async runner stages.
pub type RunnerFuture<'a> = Pin<Box<dyn Future<Output = RunnerResult> + Send + 'a>>;

/// A future that immediately succeeds; the default for optional stages.
pub fn ready_ok<'a>() -> RunnerFuture<'a> {
    Box::pin(async { RunnerResult::Ok(()) })
}

/// Type-specific behaviour of a task.
///
/// One runner instance is created per task per run (see
/// [`crate::exec::RunnerRegistry`]). The orchestrator calls, in order:
///
/// 1. `configure` with the task's merged descriptor;
/// 2. `setup`, unless the task was skipped or is not in the query;
/// 3. one of `run`, `compile` or `test`, depending on the run mode.
///
/// A runner that panics is treated exactly like one that returns an error.
pub trait TaskRunner: Send {
    /// Bind the task's parameters. Synchronous: no I/O should happen here.
    fn configure(&mut self, task: &TaskDescriptor) -> RunnerResult;

    /// Prepare for execution (check inputs, open connections...).
    fn setup(&mut self) -> RunnerFuture<'_> {
        ready_ok()
    }

    /// Execute the task with its side effects.
    fn run(&mut self) -> RunnerFuture<'_>;

    /// Produce whatever `run` would execute, without side effects.
    fn compile(&mut self) -> RunnerFuture<'_> {
        ready_ok()
    }

    /// Run the task's checks.
    fn test(&mut self) -> RunnerFuture<'_> {
        ready_ok()
    }
}
