// src/engine/context.rs

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::exec::RunnerRegistry;
use crate::task::{EventTracker, TracingTracker};
use crate::types::RunMode;

/// Everything one orchestrator invocation needs besides the tasks.
///
/// Built once per run by the caller and passed by reference; there is no
/// process-wide state.
pub struct RunContext {
    pub registry: RunnerRegistry,
    pub tracker: Arc<dyn EventTracker>,
    pub cancel: CancellationToken,
    pub mode: RunMode,
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("registry", &self.registry)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl RunContext {
    /// Built-in task types, tracing tracker, fresh cancellation token.
    pub fn new(mode: RunMode) -> Self {
        Self {
            registry: RunnerRegistry::with_builtins(),
            tracker: Arc::new(TracingTracker),
            cancel: CancellationToken::new(),
            mode,
        }
    }

    pub fn with_registry(mut self, registry: RunnerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn EventTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(RunMode::default())
    }
}
