// src/exec/mod.rs

//! Task runners.
//!
//! - [`runner`] defines the [`TaskRunner`] capability set the task wrapper drives.
//! - [`registry`] maps task types to runner factories.
//! - [`command`] and [`dummy`] are the built-in task types.

pub mod command;
pub mod dummy;
pub mod registry;
pub mod runner;

pub use command::CommandRunner;
pub use dummy::DummyRunner;
pub use registry::{RunnerFactory, RunnerRegistry};
pub use runner::{RunnerFuture, RunnerResult, TaskRunner, ready_ok};
