// src/task/tracker.rs

//! Structured task events and the trackers that consume them.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::errors::TaskError;
use crate::types::{Stage, TaskName};

/// Whether an event opens or closes a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Start,
    Finish,
}

/// How a stage ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded,
    Failed(TaskError),
    /// Blocked by a failed or skipped parent.
    Skipped,
    /// Outside the selected subset; the stage was not invoked.
    NotInQuery,
    /// The run was interrupted before the stage started.
    Interrupted,
}

/// One transition of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEvent {
    pub task: TaskName,
    pub stage: Stage,
    pub event: EventKind,
    /// Time spent in the stage; zero for `Start` and for stages that never ran.
    pub duration: Duration,
    /// Set on `Finish` only.
    pub result: Option<StageOutcome>,
}

impl TaskEvent {
    pub fn start(task: &str, stage: Stage) -> Self {
        Self {
            task: task.to_string(),
            stage,
            event: EventKind::Start,
            duration: Duration::ZERO,
            result: None,
        }
    }

    pub fn finish(task: &str, stage: Stage, duration: Duration, outcome: StageOutcome) -> Self {
        Self {
            task: task.to_string(),
            stage,
            event: EventKind::Finish,
            duration,
            result: Some(outcome),
        }
    }
}

/// Sink for task events (presentation, logging, metrics...).
///
/// The orchestrator never reads anything back from a tracker.
pub trait EventTracker: Send + Sync {
    fn record(&self, event: &TaskEvent);
}

/// Default tracker: renders every event as a `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTracker;

impl EventTracker for TracingTracker {
    fn record(&self, event: &TaskEvent) {
        let task = event.task.as_str();
        let stage = event.stage;
        let millis = event.duration.as_millis() as u64;

        match (&event.event, &event.result) {
            (EventKind::Start, _) => {
                debug!(task, %stage, "stage started");
            }
            (EventKind::Finish, Some(StageOutcome::Succeeded)) => {
                info!(task, %stage, duration_ms = millis, "stage succeeded");
            }
            (EventKind::Finish, Some(StageOutcome::Failed(err))) => {
                error!(task, %stage, duration_ms = millis, error = %err, "stage failed");
            }
            (EventKind::Finish, Some(StageOutcome::Skipped)) => {
                warn!(task, %stage, "skipped due to upstream failure");
            }
            (EventKind::Finish, Some(StageOutcome::NotInQuery)) => {
                debug!(task, %stage, "not in query; stage not invoked");
            }
            (EventKind::Finish, Some(StageOutcome::Interrupted)) => {
                warn!(task, %stage, "run interrupted before stage started");
            }
            (EventKind::Finish, None) => {
                debug!(task, %stage, duration_ms = millis, "stage finished");
            }
        }
    }
}

/// Tracker that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTracker;

impl EventTracker for NullTracker {
    fn record(&self, _event: &TaskEvent) {}
}
