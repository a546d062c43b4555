// tests/status.rs

use pipedag::task::{ParentState, StatusCell, TaskStatus, next_status};
use pipedag::types::OnFailPolicy::{NoSkip, Skip};

fn parent(status: TaskStatus, on_fail: pipedag::types::OnFailPolicy) -> ParentState {
    ParentState::new(status, on_fail)
}

#[test]
fn no_parents_never_skip() {
    assert_eq!(next_status(TaskStatus::ReadyForSetup, []), TaskStatus::ReadyForSetup);
    assert_eq!(next_status(TaskStatus::Ready, []), TaskStatus::Ready);
}

#[test]
fn failed_parent_with_skip_policy_skips() {
    let parents = [
        parent(TaskStatus::Succeeded, Skip),
        parent(TaskStatus::Failed, Skip),
    ];
    assert_eq!(next_status(TaskStatus::Ready, parents), TaskStatus::Skipped);
}

#[test]
fn failed_parent_with_no_skip_policy_does_not_skip() {
    let parents = [parent(TaskStatus::Failed, NoSkip)];
    assert_eq!(next_status(TaskStatus::Ready, parents), TaskStatus::Ready);
}

#[test]
fn skipped_parent_always_skips() {
    for policy in [Skip, NoSkip] {
        let parents = [parent(TaskStatus::Skipped, policy)];
        assert_eq!(
            next_status(TaskStatus::ReadyForSetup, parents),
            TaskStatus::Skipped
        );
    }
}

#[test]
fn not_in_query_parent_counts_as_success() {
    let parents = [parent(TaskStatus::NotInQuery, Skip)];
    assert_eq!(next_status(TaskStatus::Ready, parents), TaskStatus::Ready);
}

#[test]
fn terminal_states_are_kept() {
    let parents = [parent(TaskStatus::Failed, Skip)];
    for terminal in [
        TaskStatus::Succeeded,
        TaskStatus::Failed,
        TaskStatus::Skipped,
        TaskStatus::NotInQuery,
    ] {
        assert!(terminal.is_terminal());
        assert_eq!(next_status(terminal, parents), terminal);
    }
}

#[test]
fn status_cell_round_trips_every_state() {
    let cell = StatusCell::new(TaskStatus::Configuring);
    for status in [
        TaskStatus::Configuring,
        TaskStatus::ReadyForSetup,
        TaskStatus::SettingUp,
        TaskStatus::Ready,
        TaskStatus::Executing,
        TaskStatus::Succeeded,
        TaskStatus::Failed,
        TaskStatus::Skipped,
        TaskStatus::NotInQuery,
    ] {
        cell.set(status);
        assert_eq!(cell.get(), status);
    }
    assert_eq!(TaskStatus::NotInQuery.to_string(), "not_in_query");
}
