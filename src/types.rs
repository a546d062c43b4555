use std::fmt;
use std::str::FromStr;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// What a task's failure means for the tasks that depend on it.
///
/// - `Skip`: dependents are marked skipped (default behaviour).
/// - `NoSkip`: dependents proceed as if this task had not failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFailPolicy {
    #[default]
    Skip,
    NoSkip,
}

impl FromStr for OnFailPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(OnFailPolicy::Skip),
            "no_skip" => Ok(OnFailPolicy::NoSkip),
            other => Err(format!(
                "invalid on_fail: {other} (expected \"skip\" or \"no_skip\")"
            )),
        }
    }
}

impl fmt::Display for OnFailPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnFailPolicy::Skip => write!(f, "skip"),
            OnFailPolicy::NoSkip => write!(f, "no_skip"),
        }
    }
}

/// Which runner method the execution phase invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Execute the task for real.
    #[default]
    Run,
    /// Produce the task's artefacts without side effects (dry run).
    Compile,
    /// Run the task's checks.
    Test,
}

impl RunMode {
    /// The lifecycle stage the execution phase reports under this mode.
    pub fn stage(self) -> Stage {
        match self {
            RunMode::Run => Stage::Run,
            RunMode::Compile => Stage::Compile,
            RunMode::Test => Stage::Test,
        }
    }
}

/// Lifecycle stage of a task, as reported in events and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Configure,
    Setup,
    Run,
    Compile,
    Test,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Configure => "configure",
            Stage::Setup => "setup",
            Stage::Run => "run",
            Stage::Compile => "compile",
            Stage::Test => "test",
        };
        f.write_str(s)
    }
}
