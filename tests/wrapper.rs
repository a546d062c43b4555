// tests/wrapper.rs

mod common;
use crate::common::builders::TaskBuilder;
use crate::common::{FakeRunners, RecordingTracker, init_tracing};

use pipedag::exec::RunnerRegistry;
use pipedag::task::{EventKind, StageOutcome, TaskStatus, TaskWrapper};
use pipedag::types::{RunMode, Stage};

fn wrapper(registry: &RunnerRegistry, builder: TaskBuilder, parents: &[&TaskWrapper], in_query: bool) -> TaskWrapper {
    let descriptor = builder.build();
    let runner = registry.create(&descriptor.task_type).expect("fake type registered");
    let parents = parents.iter().map(|p| p.handle()).collect();
    TaskWrapper::new(descriptor, runner, parents, in_query)
}

#[tokio::test]
async fn walks_the_main_path_and_reports_each_stage() {
    init_tracing();
    let runners = FakeRunners::new();
    let registry = runners.registry();
    let tracker = RecordingTracker::new();

    let mut task = wrapper(&registry, TaskBuilder::new("solo").tag("nightly"), &[], true);
    assert_eq!(task.status(), TaskStatus::Configuring);
    assert!(task.in_query());
    assert_eq!(task.descriptor().tags, vec!["nightly".to_string()]);

    assert_eq!(task.configure(&tracker), TaskStatus::ReadyForSetup);
    assert_eq!(task.setup(&tracker).await, TaskStatus::Ready);
    assert_eq!(task.execute(RunMode::Run, &tracker).await, TaskStatus::Succeeded);

    let events: Vec<(Stage, EventKind)> = tracker
        .events()
        .into_iter()
        .map(|e| (e.stage, e.event))
        .collect();
    assert_eq!(
        events,
        vec![
            (Stage::Configure, EventKind::Start),
            (Stage::Configure, EventKind::Finish),
            (Stage::Setup, EventKind::Start),
            (Stage::Setup, EventKind::Finish),
            (Stage::Run, EventKind::Start),
            (Stage::Run, EventKind::Finish),
        ]
    );
    assert!(
        tracker
            .finishes("solo")
            .iter()
            .all(|e| e.result == Some(StageOutcome::Succeeded))
    );
}

#[tokio::test]
async fn not_in_query_parent_is_transparent() {
    init_tracing();
    let runners = FakeRunners::new();
    let registry = runners.registry();
    let tracker = RecordingTracker::new();

    let mut parent = wrapper(&registry, TaskBuilder::new("parent"), &[], false);
    let mut child = wrapper(&registry, TaskBuilder::new("child").after("parent"), &[&parent], true);
    assert!(!parent.in_query());

    assert_eq!(parent.configure(&tracker), TaskStatus::NotInQuery);
    assert_eq!(child.configure(&tracker), TaskStatus::ReadyForSetup);

    // Stages on a task outside the query are no-ops.
    assert_eq!(parent.setup(&tracker).await, TaskStatus::NotInQuery);
    assert_eq!(parent.execute(RunMode::Run, &tracker).await, TaskStatus::NotInQuery);

    assert_eq!(child.setup(&tracker).await, TaskStatus::Ready);
    assert_eq!(child.execute(RunMode::Run, &tracker).await, TaskStatus::Succeeded);
    assert_eq!(runners.calls_for(Stage::Run), vec!["child"]);
}

#[tokio::test]
async fn parent_failure_after_setup_skips_before_execution() {
    init_tracing();
    let runners = FakeRunners::new();
    runners.fail("parent", Stage::Run);
    let registry = runners.registry();
    let tracker = RecordingTracker::new();

    let mut parent = wrapper(&registry, TaskBuilder::new("parent"), &[], true);
    let mut child = wrapper(&registry, TaskBuilder::new("child").after("parent"), &[&parent], true);

    parent.configure(&tracker);
    child.configure(&tracker);
    parent.setup(&tracker).await;
    assert_eq!(child.setup(&tracker).await, TaskStatus::Ready);

    assert_eq!(parent.execute(RunMode::Run, &tracker).await, TaskStatus::Failed);
    assert!(parent.error().is_some());
    assert_eq!(child.execute(RunMode::Run, &tracker).await, TaskStatus::Skipped);
    assert!(child.error().is_none());

    assert_eq!(child.interrupt(Stage::Run, &tracker), TaskStatus::Skipped);
    assert_eq!(tracker.last_outcome("child"), Some(StageOutcome::Skipped));
}

#[test]
fn interrupt_respects_query_membership() {
    init_tracing();
    let runners = FakeRunners::new();
    let registry = runners.registry();
    let tracker = RecordingTracker::new();

    let mut outside = wrapper(&registry, TaskBuilder::new("outside"), &[], false);
    let mut inside = wrapper(&registry, TaskBuilder::new("inside").after("outside"), &[&outside], true);

    assert_eq!(outside.interrupt(Stage::Configure, &tracker), TaskStatus::NotInQuery);
    assert_eq!(inside.interrupt(Stage::Configure, &tracker), TaskStatus::Skipped);
    assert_eq!(tracker.last_outcome("outside"), Some(StageOutcome::NotInQuery));
    assert_eq!(tracker.last_outcome("inside"), Some(StageOutcome::Interrupted));
    assert!(runners.calls().is_empty());

    // Already terminal: nothing changes and nothing is recorded.
    let before = tracker.events().len();
    assert_eq!(inside.interrupt(Stage::Run, &tracker), TaskStatus::Skipped);
    assert_eq!(tracker.events().len(), before);
}
