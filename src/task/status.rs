// src/task/status.rs

//! Task lifecycle states and the skip-propagation rule.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::types::OnFailPolicy;

/// Lifecycle status of a task within one run.
///
/// Main path:
/// `Configuring -> ReadyForSetup -> SettingUp -> Ready -> Executing -> Succeeded`.
///
/// `Failed` is reachable from every non-terminal state. `Skipped` is entered
/// by the skip check before setup or before execution. `NotInQuery` is
/// entered after configuration for tasks outside the selected subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TaskStatus {
    Configuring = 0,
    ReadyForSetup = 1,
    SettingUp = 2,
    Ready = 3,
    Executing = 4,
    Succeeded = 5,
    Failed = 6,
    Skipped = 7,
    NotInQuery = 8,
}

impl TaskStatus {
    /// Whether no further transition can happen in this run.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Skipped | TaskStatus::NotInQuery
        )
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => TaskStatus::Configuring,
            1 => TaskStatus::ReadyForSetup,
            2 => TaskStatus::SettingUp,
            3 => TaskStatus::Ready,
            4 => TaskStatus::Executing,
            5 => TaskStatus::Succeeded,
            6 => TaskStatus::Failed,
            7 => TaskStatus::Skipped,
            _ => TaskStatus::NotInQuery,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Configuring => "configuring",
            TaskStatus::ReadyForSetup => "ready_for_setup",
            TaskStatus::SettingUp => "setting_up",
            TaskStatus::Ready => "ready",
            TaskStatus::Executing => "executing",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
            TaskStatus::NotInQuery => "not_in_query",
        };
        f.write_str(s)
    }
}

/// Status storage shared between a task and the tasks that depend on it.
///
/// Only the owning task writes; children read it for their skip check.
#[derive(Debug)]
pub struct StatusCell(AtomicU8);

impl StatusCell {
    pub fn new(status: TaskStatus) -> Self {
        Self(AtomicU8::new(status as u8))
    }

    pub fn get(&self) -> TaskStatus {
        TaskStatus::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, status: TaskStatus) {
        self.0.store(status as u8, Ordering::Release);
    }
}

/// What a child needs to know about one parent for the skip check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentState {
    pub status: TaskStatus,
    pub on_fail: OnFailPolicy,
}

impl ParentState {
    pub fn new(status: TaskStatus, on_fail: OnFailPolicy) -> Self {
        Self { status, on_fail }
    }

    /// A skipped parent always blocks; a failed one only under `on_fail = skip`.
    /// `NotInQuery` counts as success.
    pub fn blocks_children(&self) -> bool {
        match self.status {
            TaskStatus::Skipped => true,
            TaskStatus::Failed => self.on_fail == OnFailPolicy::Skip,
            _ => false,
        }
    }
}

/// Apply the skip check to a task in state `current`.
///
/// Terminal states are returned unchanged. Otherwise the task becomes
/// `Skipped` if any parent blocks its children, and keeps `current` if none
/// does.
pub fn next_status<I>(current: TaskStatus, parents: I) -> TaskStatus
where
    I: IntoIterator<Item = ParentState>,
{
    if current.is_terminal() {
        return current;
    }

    if parents.into_iter().any(|p| p.blocks_children()) {
        TaskStatus::Skipped
    } else {
        current
    }
}
