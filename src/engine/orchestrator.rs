// src/engine/orchestrator.rs

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{ProjectFile, resolve_tasks};
use crate::engine::context::RunContext;
use crate::engine::plan::ExecutionPlan;
use crate::engine::report::RunReport;
use crate::errors::{ConfigError, Result};
use crate::task::{EventTracker, TaskHandle, TaskSet, TaskWrapper};
use crate::types::Stage;

/// Drives one run: builds the plan, wraps every task and walks the
/// topological order three times (configure, setup, execute).
///
/// Fail-fast problems (presets, graph, query, unknown task types) come back
/// as `Err` before any runner is touched. Task failures never abort the
/// walk; they are reported in the [`RunReport`].
#[derive(Debug)]
pub struct Orchestrator<'a> {
    ctx: &'a RunContext,
}

impl<'a> Orchestrator<'a> {
    pub fn new(ctx: &'a RunContext) -> Self {
        Self { ctx }
    }

    /// Resolve presets into task descriptors, then [`Orchestrator::run`].
    pub async fn run_project<S: AsRef<str>>(
        &self,
        project: &ProjectFile,
        include: &[S],
        exclude: &[S],
    ) -> Result<RunReport> {
        let tasks = resolve_tasks(project)?;
        self.run(&tasks, include, exclude).await
    }

    pub async fn run<S: AsRef<str>>(
        &self,
        tasks: &TaskSet,
        include: &[S],
        exclude: &[S],
    ) -> Result<RunReport> {
        let plan = ExecutionPlan::build(tasks, include, exclude)?;
        let mut wrappers = self.wrap(tasks, &plan)?;

        info!(
            mode = ?self.ctx.mode,
            tasks = wrappers.len(),
            selected = plan.selected().len(),
            "starting run"
        );

        let mut report = RunReport::default();
        let tracker = self.ctx.tracker.as_ref();

        self.configure_all(&mut wrappers, tracker, &mut report);
        self.setup_all(&mut wrappers, tracker, &mut report).await;
        self.execute_all(&mut wrappers, tracker, &mut report).await;

        for wrapper in &wrappers {
            report.record(wrapper.name(), wrapper.status());
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            not_in_query = report.not_in_query.len(),
            interrupted = report.interrupted,
            "run finished"
        );
        Ok(report)
    }

    /// One wrapper per task in topological order, each holding its parents'
    /// handles.
    fn wrap(&self, tasks: &TaskSet, plan: &ExecutionPlan) -> Result<Vec<TaskWrapper>> {
        let mut handles: HashMap<&str, Arc<TaskHandle>> = HashMap::with_capacity(tasks.len());
        let mut wrappers = Vec::with_capacity(tasks.len());

        for name in plan.order() {
            let Some(descriptor) = tasks.get(name) else {
                continue;
            };

            let runner = self.ctx.registry.create(&descriptor.task_type).ok_or_else(|| {
                ConfigError::UnknownTaskType {
                    task: descriptor.name.clone(),
                    task_type: descriptor.task_type.clone(),
                }
            })?;

            // Parents precede children in `order`, so their handles exist.
            let parents: Vec<Arc<TaskHandle>> = descriptor
                .parents
                .iter()
                .filter_map(|p| handles.get(p.as_str()).cloned())
                .collect();

            let wrapper = TaskWrapper::new(descriptor.clone(), runner, parents, plan.is_selected(name));
            handles.insert(name.as_str(), wrapper.handle());
            wrappers.push(wrapper);
        }

        debug!(wrappers = wrappers.len(), "created task wrappers");
        Ok(wrappers)
    }

    fn configure_all(
        &self,
        wrappers: &mut [TaskWrapper],
        tracker: &dyn EventTracker,
        report: &mut RunReport,
    ) {
        for wrapper in wrappers.iter_mut() {
            if self.interrupted(wrapper, Stage::Configure, tracker, report) {
                continue;
            }
            wrapper.configure(tracker);
            collect_error(wrapper, report);
        }
    }

    async fn setup_all(
        &self,
        wrappers: &mut [TaskWrapper],
        tracker: &dyn EventTracker,
        report: &mut RunReport,
    ) {
        for wrapper in wrappers.iter_mut() {
            if self.interrupted(wrapper, Stage::Setup, tracker, report) {
                continue;
            }
            wrapper.setup(tracker).await;
            collect_error(wrapper, report);
        }
    }

    async fn execute_all(
        &self,
        wrappers: &mut [TaskWrapper],
        tracker: &dyn EventTracker,
        report: &mut RunReport,
    ) {
        let mode = self.ctx.mode;
        for wrapper in wrappers.iter_mut() {
            if self.interrupted(wrapper, mode.stage(), tracker, report) {
                continue;
            }
            wrapper.execute(mode, tracker).await;
            collect_error(wrapper, report);
        }
    }

    /// Checked before every task start. Once the token is cancelled no runner
    /// method is called again.
    fn interrupted(
        &self,
        wrapper: &mut TaskWrapper,
        stage: Stage,
        tracker: &dyn EventTracker,
        report: &mut RunReport,
    ) -> bool {
        if !self.ctx.cancel.is_cancelled() {
            return false;
        }
        if !report.interrupted {
            warn!(%stage, task = %wrapper.name(), "run interrupted; remaining tasks will not start");
            report.interrupted = true;
        }
        wrapper.interrupt(stage, tracker);
        true
    }
}

fn collect_error(wrapper: &mut TaskWrapper, report: &mut RunReport) {
    if let Some(err) = wrapper.take_error() {
        report.errors.push(err);
    }
}
