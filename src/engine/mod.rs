// src/engine/mod.rs

//! Orchestration engine.
//!
//! - [`plan`] validates the graph and resolves the task query.
//! - [`orchestrator`] wraps every task and drives the configure, setup and
//!   execute phases in topological order.
//! - [`context`] carries the per-run collaborators (runner registry, event
//!   tracker, cancellation token, run mode).
//! - [`report`] is the outcome handed back to the caller.

pub mod context;
pub mod orchestrator;
pub mod plan;
pub mod report;

pub use context::RunContext;
pub use orchestrator::Orchestrator;
pub use plan::{ExecutionPlan, PlanEntry};
pub use report::RunReport;
