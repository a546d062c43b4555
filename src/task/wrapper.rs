// src/task/wrapper.rs

//! Per-task state machine around a runner.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tracing::{debug, trace};

use crate::errors::TaskError;
use crate::exec::runner::{RunnerFuture, TaskRunner, ready_ok};
use crate::task::descriptor::TaskDescriptor;
use crate::task::status::{ParentState, StatusCell, TaskStatus, next_status};
use crate::task::tracker::{EventTracker, StageOutcome, TaskEvent};
use crate::types::{OnFailPolicy, RunMode, Stage, TaskName};

/// The part of a task its children can see: name, failure policy and status.
#[derive(Debug)]
pub struct TaskHandle {
    name: TaskName,
    on_fail: OnFailPolicy,
    status: StatusCell,
}

impl TaskHandle {
    pub fn new(name: impl Into<TaskName>, on_fail: OnFailPolicy) -> Self {
        Self {
            name: name.into(),
            on_fail,
            status: StatusCell::new(TaskStatus::Configuring),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn on_fail(&self) -> OnFailPolicy {
        self.on_fail
    }

    pub fn status(&self) -> TaskStatus {
        self.status.get()
    }

    pub fn parent_state(&self) -> ParentState {
        ParentState::new(self.status(), self.on_fail)
    }
}

/// One task of one run.
///
/// Owns the task's runner and status; holds shared handles to its parents so
/// the skip check reads their current status without going through the
/// orchestrator.
pub struct TaskWrapper {
    descriptor: TaskDescriptor,
    handle: Arc<TaskHandle>,
    parents: Vec<Arc<TaskHandle>>,
    runner: Box<dyn TaskRunner>,
    in_query: bool,
    error: Option<TaskError>,
}

impl std::fmt::Debug for TaskWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskWrapper")
            .field("name", &self.descriptor.name)
            .field("status", &self.status())
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("in_query", &self.in_query)
            .finish()
    }
}

impl TaskWrapper {
    /// `parents` must be the handles of the descriptor's parents, in the
    /// descriptor's order.
    pub fn new(
        descriptor: TaskDescriptor,
        runner: Box<dyn TaskRunner>,
        parents: Vec<Arc<TaskHandle>>,
        in_query: bool,
    ) -> Self {
        let handle = Arc::new(TaskHandle::new(descriptor.name.clone(), descriptor.on_fail));
        Self {
            descriptor,
            handle,
            parents,
            runner,
            in_query,
            error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    pub fn handle(&self) -> Arc<TaskHandle> {
        Arc::clone(&self.handle)
    }

    pub fn status(&self) -> TaskStatus {
        self.handle.status()
    }

    pub fn in_query(&self) -> bool {
        self.in_query
    }

    /// The error that failed this task, if it failed.
    pub fn error(&self) -> Option<&TaskError> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<TaskError> {
        self.error.take()
    }

    /// `Configuring -> ReadyForSetup | NotInQuery | Failed`.
    ///
    /// Every task is configured, in the query or not, so that parameter
    /// errors surface regardless of the selection.
    pub fn configure(&mut self, tracker: &dyn EventTracker) -> TaskStatus {
        if self.status() != TaskStatus::Configuring {
            return self.status();
        }

        let stage = Stage::Configure;
        tracker.record(&TaskEvent::start(self.name(), stage));
        let started = Instant::now();

        let runner = &mut self.runner;
        let descriptor = &self.descriptor;
        let result = panic::catch_unwind(AssertUnwindSafe(|| runner.configure(descriptor)));

        let elapsed = started.elapsed();
        match self.stage_result(stage, result) {
            Ok(()) if self.in_query => {
                self.transition(TaskStatus::ReadyForSetup);
                tracker.record(&TaskEvent::finish(
                    self.name(),
                    stage,
                    elapsed,
                    StageOutcome::Succeeded,
                ));
            }
            Ok(()) => {
                self.transition(TaskStatus::NotInQuery);
                tracker.record(&TaskEvent::finish(
                    self.name(),
                    stage,
                    elapsed,
                    StageOutcome::NotInQuery,
                ));
            }
            Err(err) => self.fail(stage, elapsed, err, tracker),
        }

        self.status()
    }

    /// `ReadyForSetup -> SettingUp -> Ready`, or `Skipped` / `Failed`.
    /// Tasks in any other state are left alone.
    pub async fn setup(&mut self, tracker: &dyn EventTracker) -> TaskStatus {
        if self.status() != TaskStatus::ReadyForSetup {
            return self.status();
        }
        if self.skip_if_blocked(Stage::Setup, tracker) {
            return self.status();
        }

        self.transition(TaskStatus::SettingUp);
        match self.invoke(Stage::Setup, tracker).await {
            Ok(elapsed) => {
                self.transition(TaskStatus::Ready);
                tracker.record(&TaskEvent::finish(
                    self.name(),
                    Stage::Setup,
                    elapsed,
                    StageOutcome::Succeeded,
                ));
            }
            Err((elapsed, err)) => self.fail(Stage::Setup, elapsed, err, tracker),
        }

        self.status()
    }

    /// `Ready -> Executing -> Succeeded`, or `Skipped` / `Failed`.
    /// `mode` picks `run`, `compile` or `test` on the runner.
    pub async fn execute(&mut self, mode: RunMode, tracker: &dyn EventTracker) -> TaskStatus {
        if self.status() != TaskStatus::Ready {
            return self.status();
        }
        let stage = mode.stage();
        if self.skip_if_blocked(stage, tracker) {
            return self.status();
        }

        self.transition(TaskStatus::Executing);
        match self.invoke(stage, tracker).await {
            Ok(elapsed) => {
                self.transition(TaskStatus::Succeeded);
                tracker.record(&TaskEvent::finish(
                    self.name(),
                    stage,
                    elapsed,
                    StageOutcome::Succeeded,
                ));
            }
            Err((elapsed, err)) => self.fail(stage, elapsed, err, tracker),
        }

        self.status()
    }

    /// Mark a task that has not finished as `Skipped` because the run was
    /// interrupted before `stage` could start. Tasks outside the query become
    /// `NotInQuery` instead. Terminal tasks are unchanged.
    pub fn interrupt(&mut self, stage: Stage, tracker: &dyn EventTracker) -> TaskStatus {
        if self.status().is_terminal() {
            return self.status();
        }
        let (status, outcome) = if self.in_query {
            (TaskStatus::Skipped, StageOutcome::Interrupted)
        } else {
            (TaskStatus::NotInQuery, StageOutcome::NotInQuery)
        };
        self.transition(status);
        tracker.record(&TaskEvent::finish(self.name(), stage, Duration::ZERO, outcome));
        self.status()
    }

    fn skip_if_blocked(&mut self, stage: Stage, tracker: &dyn EventTracker) -> bool {
        let current = self.status();
        let next = next_status(current, self.parents.iter().map(|p| p.parent_state()));
        if next == current {
            return false;
        }

        debug!(
            task = %self.name(),
            blocked_by = ?self.blocking_parents(),
            "skipping task"
        );
        self.transition(next);
        tracker.record(&TaskEvent::finish(
            self.name(),
            stage,
            Duration::ZERO,
            StageOutcome::Skipped,
        ));
        true
    }

    fn blocking_parents(&self) -> Vec<&str> {
        self.parents
            .iter()
            .filter(|p| p.parent_state().blocks_children())
            .map(|p| p.name())
            .collect()
    }

    /// Run one async stage of the runner, catching panics.
    async fn invoke(
        &mut self,
        stage: Stage,
        tracker: &dyn EventTracker,
    ) -> Result<Duration, (Duration, TaskError)> {
        tracker.record(&TaskEvent::start(self.name(), stage));
        let started = Instant::now();

        let runner = self.runner.as_mut();
        // The stage call itself happens inside the async block so a panic
        // before the first await is caught too.
        let result = AssertUnwindSafe(async move { stage_future(runner, stage).await })
            .catch_unwind()
            .await;

        let elapsed = started.elapsed();
        self.stage_result(stage, result)
            .map(|()| elapsed)
            .map_err(|err| (elapsed, err))
    }

    fn stage_result(
        &self,
        stage: Stage,
        result: Result<anyhow::Result<()>, Box<dyn Any + Send>>,
    ) -> Result<(), TaskError> {
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(TaskError::Failed {
                task: self.descriptor.name.clone(),
                stage,
                message: format!("{err:#}"),
            }),
            Err(payload) => Err(TaskError::Panicked {
                task: self.descriptor.name.clone(),
                stage,
                payload: panic_message(payload.as_ref()),
            }),
        }
    }

    fn fail(&mut self, stage: Stage, elapsed: Duration, err: TaskError, tracker: &dyn EventTracker) {
        self.transition(TaskStatus::Failed);
        tracker.record(&TaskEvent::finish(
            self.name(),
            stage,
            elapsed,
            StageOutcome::Failed(err.clone()),
        ));
        self.error = Some(err);
    }

    fn transition(&self, to: TaskStatus) {
        let from = self.handle.status();
        trace!(task = %self.name(), %from, %to, "status transition");
        self.handle.status.set(to);
    }
}

fn stage_future(runner: &mut dyn TaskRunner, stage: Stage) -> RunnerFuture<'_> {
    match stage {
        Stage::Setup => runner.setup(),
        Stage::Run => runner.run(),
        Stage::Compile => runner.compile(),
        Stage::Test => runner.test(),
        // configure is synchronous and driven by `TaskWrapper::configure`.
        Stage::Configure => ready_ok(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
