// src/engine/report.rs

use crate::errors::TaskError;
use crate::task::TaskStatus;
use crate::types::TaskName;

/// Final state of every task of one run. Name lists are in topological order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub succeeded: Vec<TaskName>,
    pub failed: Vec<TaskName>,
    pub skipped: Vec<TaskName>,
    pub not_in_query: Vec<TaskName>,
    /// One entry per failed task, in the order the failures happened.
    pub errors: Vec<TaskError>,
    /// Set when the run was cancelled before every task could start.
    pub interrupted: bool,
}

impl RunReport {
    pub(crate) fn record(&mut self, task: &str, status: TaskStatus) {
        let bucket = match status {
            TaskStatus::Succeeded => &mut self.succeeded,
            TaskStatus::Failed => &mut self.failed,
            TaskStatus::NotInQuery => &mut self.not_in_query,
            // Anything still in flight when the run ends never completed.
            _ => &mut self.skipped,
        };
        bucket.push(task.to_string());
    }

    /// A run succeeds when nothing failed and nothing was skipped.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    /// Process exit code for this report.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len() + self.not_in_query.len()
    }

    /// The error recorded for `task`, if it failed.
    pub fn error_for(&self, task: &str) -> Option<&TaskError> {
        self.errors.iter().find(|e| e.task() == task)
    }
}
