use std::sync::{Arc, Mutex};

use pipedag::task::{EventKind, EventTracker, StageOutcome, TaskEvent};

/// Tracker that keeps every event for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracker {
    events: Arc<Mutex<Vec<TaskEvent>>>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TaskEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Finish events of one task, in order.
    pub fn finishes(&self, task: &str) -> Vec<TaskEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.task == task && e.event == EventKind::Finish)
            .collect()
    }

    /// The outcome of the last finished stage of `task`.
    pub fn last_outcome(&self, task: &str) -> Option<StageOutcome> {
        self.finishes(task).pop().and_then(|e| e.result)
    }
}

impl EventTracker for RecordingTracker {
    fn record(&self, event: &TaskEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
