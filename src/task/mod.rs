// src/task/mod.rs

//! Tasks: resolved descriptors, lifecycle status and the per-task wrapper
//! that drives a runner through configure, setup and execution.

pub mod descriptor;
pub mod status;
pub mod tracker;
pub mod wrapper;

pub use descriptor::{TaskDescriptor, TaskIndex, TaskSet};
pub use status::{ParentState, StatusCell, TaskStatus, next_status};
pub use tracker::{EventKind, EventTracker, NullTracker, StageOutcome, TaskEvent, TracingTracker};
pub use wrapper::{TaskHandle, TaskWrapper};
