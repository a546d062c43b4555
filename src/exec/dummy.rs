// src/exec/dummy.rs

use tracing::debug;

use crate::exec::runner::{RunnerFuture, RunnerResult, TaskRunner};
use crate::task::TaskDescriptor;

/// Task type that does nothing. Useful for grouping nodes that only exist to
/// fan dependencies in or out.
#[derive(Debug, Default)]
pub struct DummyRunner {
    name: String,
}

impl DummyRunner {
    pub const TYPE: &'static str = "dummy";
}

impl TaskRunner for DummyRunner {
    fn configure(&mut self, task: &TaskDescriptor) -> RunnerResult {
        self.name = task.name.clone();
        Ok(())
    }

    fn run(&mut self) -> RunnerFuture<'_> {
        Box::pin(async move {
            debug!(task = %self.name, "dummy task: nothing to run");
            Ok(())
        })
    }
}
