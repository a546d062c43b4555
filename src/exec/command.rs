// src/exec/command.rs

//! Shell command task type.
//!
//! ```toml
//! [group.extract.task.load_users]
//! type = "command"
//! cmd = "python load.py users"
//! test_cmd = "python check.py users"   # optional
//! cwd = "jobs"                         # optional
//! env = { MODE = "full" }              # optional
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, anyhow, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use toml::Value;
use tracing::{debug, info};

use crate::exec::runner::{RunnerFuture, RunnerResult, TaskRunner};
use crate::task::TaskDescriptor;

/// Runs `cmd` through the platform shell; a non-zero exit status fails the task.
#[derive(Debug, Default)]
pub struct CommandRunner {
    name: String,
    cmd: String,
    test_cmd: Option<String>,
    cwd: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl CommandRunner {
    pub const TYPE: &'static str = "command";
}

impl TaskRunner for CommandRunner {
    fn configure(&mut self, task: &TaskDescriptor) -> RunnerResult {
        self.name = task.name.clone();

        self.cmd = match task.params.get("cmd") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::String(_)) => bail!("`cmd` must not be empty"),
            Some(_) => bail!("`cmd` must be a string"),
            None => bail!("command tasks need a `cmd`"),
        };

        self.test_cmd = match task.params.get("test_cmd") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => bail!("`test_cmd` must be a string"),
        };

        self.cwd = match task.params.get("cwd") {
            None => None,
            Some(Value::String(s)) => Some(PathBuf::from(s)),
            Some(_) => bail!("`cwd` must be a string"),
        };

        self.env.clear();
        if let Some(env) = task.params.get("env") {
            let table = env
                .as_table()
                .ok_or_else(|| anyhow!("`env` must be a table of strings"))?;
            for (key, value) in table {
                let value = value
                    .as_str()
                    .ok_or_else(|| anyhow!("`env.{key}` must be a string"))?;
                self.env.insert(key.clone(), value.to_string());
            }
        }

        Ok(())
    }

    fn setup(&mut self) -> RunnerFuture<'_> {
        Box::pin(async move {
            if let Some(cwd) = &self.cwd {
                let meta = tokio::fs::metadata(cwd)
                    .await
                    .with_context(|| format!("working directory {cwd:?} for task '{}'", self.name))?;
                if !meta.is_dir() {
                    bail!("working directory {cwd:?} is not a directory");
                }
            }
            Ok(())
        })
    }

    fn run(&mut self) -> RunnerFuture<'_> {
        Box::pin(async move { self.spawn_and_wait(&self.cmd).await })
    }

    fn compile(&mut self) -> RunnerFuture<'_> {
        Box::pin(async move {
            info!(task = %self.name, cmd = %self.cmd, "compiled command (not executed)");
            Ok(())
        })
    }

    fn test(&mut self) -> RunnerFuture<'_> {
        Box::pin(async move {
            match &self.test_cmd {
                Some(cmd) => self.spawn_and_wait(cmd).await,
                None => {
                    debug!(task = %self.name, "no test_cmd; nothing to test");
                    Ok(())
                }
            }
        })
    }
}

impl CommandRunner {
    async fn spawn_and_wait(&self, script: &str) -> RunnerResult {
        info!(task = %self.name, cmd = %script, "starting task process");

        // Build a shell command appropriate for the platform.
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(script);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(script);
            c
        };

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd.envs(&self.env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning process for task '{}'", self.name))?;

        // Always consume both pipes so buffers don't fill.
        let stdout_task = child.stdout.take().map(|stdout| {
            let task_name = self.name.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    info!(task = %task_name, "stdout: {}", line);
                }
            })
        });
        let stderr_task = child.stderr.take().map(|stderr| {
            let task_name = self.name.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(task = %task_name, "stderr: {}", line);
                }
            })
        });

        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for process of task '{}'", self.name))?;

        for reader in [stdout_task, stderr_task].into_iter().flatten() {
            let _ = reader.await;
        }

        let code = status.code().unwrap_or(-1);
        info!(
            task = %self.name,
            exit_code = code,
            success = status.success(),
            "task process exited"
        );

        if status.success() {
            Ok(())
        } else {
            Err(anyhow!("command exited with status {code}"))
        }
    }
}
