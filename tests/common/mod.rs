#![allow(dead_code)]

pub use pipedag_test_utils::builders;
pub use pipedag_test_utils::fake_runner::{FakeRunners, Outcome};
pub use pipedag_test_utils::tracker::RecordingTracker;
pub use pipedag_test_utils::{fake_context, init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
