// src/exec/registry.rs

use std::collections::BTreeMap;
use std::fmt;

use crate::exec::command::CommandRunner;
use crate::exec::dummy::DummyRunner;
use crate::exec::runner::TaskRunner;

/// Produces a fresh runner for one task.
pub type RunnerFactory = Box<dyn Fn() -> Box<dyn TaskRunner> + Send + Sync>;

/// Table from task type (the `type = "..."` property) to runner factory.
///
/// New task types are added by registering a factory, never by matching on
/// type strings elsewhere.
#[derive(Default)]
pub struct RunnerRegistry {
    factories: BTreeMap<String, RunnerFactory>,
}

impl fmt::Debug for RunnerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RunnerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `command` and `dummy` task types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(CommandRunner::TYPE, || {
            Box::new(CommandRunner::default()) as Box<dyn TaskRunner>
        });
        registry.register(DummyRunner::TYPE, || {
            Box::new(DummyRunner::default()) as Box<dyn TaskRunner>
        });
        registry
    }

    /// Register (or replace) the factory for `task_type`.
    pub fn register<F>(&mut self, task_type: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn TaskRunner> + Send + Sync + 'static,
    {
        self.factories.insert(task_type.into(), Box::new(factory));
    }

    /// Create a runner for `task_type`, or `None` if the type is unknown.
    pub fn create(&self, task_type: &str) -> Option<Box<dyn TaskRunner>> {
        self.factories.get(task_type).map(|factory| factory())
    }

    pub fn contains(&self, task_type: &str) -> bool {
        self.factories.contains_key(task_type)
    }

    /// Registered task types, sorted.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
