use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use pipedag::exec::{RunnerFuture, RunnerRegistry, RunnerResult, TaskRunner};
use pipedag::task::TaskDescriptor;
use pipedag::types::Stage;
use tokio_util::sync::CancellationToken;

/// What a scripted stage does.
#[derive(Debug, Clone)]
pub enum Outcome {
    Succeed,
    Fail(String),
    Panic(String),
    /// Succeed, then cancel the run's token.
    Cancel(CancellationToken),
}

#[derive(Debug, Default)]
struct Inner {
    script: HashMap<(String, Stage), Outcome>,
    calls: Vec<(String, Stage)>,
}

/// Shared script and call log for every [`FakeRunner`] it creates.
///
/// Stages without a scripted outcome succeed.
#[derive(Debug, Clone, Default)]
pub struct FakeRunners {
    inner: Arc<Mutex<Inner>>,
}

impl FakeRunners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, task: &str, stage: Stage, outcome: Outcome) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .script
            .insert((task.to_string(), stage), outcome);
        self
    }

    pub fn fail(&self, task: &str, stage: Stage) -> &Self {
        self.script(task, stage, Outcome::Fail(format!("{task} failed on purpose")))
    }

    pub fn panic(&self, task: &str, stage: Stage) -> &Self {
        self.script(task, stage, Outcome::Panic(format!("{task} panicked on purpose")))
    }

    /// Every runner call so far, in order.
    pub fn calls(&self) -> Vec<(String, Stage)> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Tasks that had `stage` invoked, in order.
    pub fn calls_for(&self, stage: Stage) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(_, s)| *s == stage)
            .map(|(t, _)| t)
            .collect()
    }

    /// A registry whose `fake` type produces runners backed by this script.
    pub fn registry(&self) -> RunnerRegistry {
        let mut registry = RunnerRegistry::new();
        let shared = self.clone();
        registry.register(FakeRunner::TYPE, move || {
            Box::new(FakeRunner {
                name: String::new(),
                shared: shared.clone(),
            }) as Box<dyn TaskRunner>
        });
        registry
    }

    fn enter(&self, task: &str, stage: Stage) -> Option<Outcome> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push((task.to_string(), stage));
        inner.script.get(&(task.to_string(), stage)).cloned()
    }
}

/// Runner whose behaviour comes from a [`FakeRunners`] script.
pub struct FakeRunner {
    name: String,
    shared: FakeRunners,
}

impl FakeRunner {
    pub const TYPE: &'static str = "fake";

    fn act(&self, stage: Stage) -> RunnerResult {
        match self.shared.enter(&self.name, stage) {
            None | Some(Outcome::Succeed) => Ok(()),
            Some(Outcome::Fail(msg)) => Err(anyhow!(msg)),
            Some(Outcome::Panic(msg)) => panic!("{msg}"),
            Some(Outcome::Cancel(token)) => {
                token.cancel();
                Ok(())
            }
        }
    }
}

impl TaskRunner for FakeRunner {
    fn configure(&mut self, task: &TaskDescriptor) -> RunnerResult {
        self.name = task.name.clone();
        self.act(Stage::Configure)
    }

    fn setup(&mut self) -> RunnerFuture<'_> {
        Box::pin(async move { self.act(Stage::Setup) })
    }

    fn run(&mut self) -> RunnerFuture<'_> {
        Box::pin(async move { self.act(Stage::Run) })
    }

    fn compile(&mut self) -> RunnerFuture<'_> {
        Box::pin(async move { self.act(Stage::Compile) })
    }

    fn test(&mut self) -> RunnerFuture<'_> {
        Box::pin(async move { self.act(Stage::Test) })
    }
}
