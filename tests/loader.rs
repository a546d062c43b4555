// tests/loader.rs

mod common;
use crate::common::TestResult;

use std::io::Write;

use pipedag::config::{default_config_path, load_and_validate, load_from_path, resolve_tasks};
use pipedag::errors::{ErrorKind, PipedagError};
use pipedag::types::OnFailPolicy;
use tempfile::NamedTempFile;

const PROJECT: &str = r#"
[presets.base]
type = "command"
tags = ["nightly"]

[group.extract.presets.fast]
preset = "base"
on_fail = "no_skip"

[group.extract.task.bootstrap]
type = "dummy"

[group.extract.task.load_users]
preset = "fast"
cmd = "echo users"
parents = ["bootstrap"]
"#;

fn write_project(contents: &str) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn loads_the_documented_project_shape() -> TestResult {
    let file = write_project(PROJECT)?;

    let project = load_and_validate(file.path())?;
    assert_eq!(project.task_count(), 2);
    assert!(project.presets.contains_key("base"));

    let tasks = resolve_tasks(&project)?;
    let load = tasks.get("load_users").ok_or("load_users missing")?;
    assert_eq!(load.task_type, "command");
    assert_eq!(load.tags, vec!["nightly".to_string()]);
    assert_eq!(load.parents, vec!["bootstrap".to_string()]);
    assert_eq!(load.on_fail, OnFailPolicy::NoSkip);
    Ok(())
}

#[test]
fn parse_only_load_accepts_projects_without_tasks() -> TestResult {
    let file = write_project("[presets.base]\ntype = \"dummy\"\n")?;
    let raw = load_from_path(file.path())?;
    assert!(raw.group.is_empty());

    let err = load_and_validate(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    Ok(())
}

#[test]
fn missing_file_reports_its_path() {
    let err = load_from_path("definitely/not/here/pipedag.toml").unwrap_err();
    assert!(matches!(err, PipedagError::ReadConfig { .. }));
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("definitely/not/here"));
}

#[test]
fn invalid_toml_is_a_config_error() -> TestResult {
    let file = write_project("[group.g.task.t\ntype = ")?;
    let err = load_from_path(file.path()).unwrap_err();
    assert!(matches!(err, PipedagError::TomlError(_)));
    assert_eq!(err.code(), "config.toml");
    Ok(())
}

#[test]
fn default_path_is_in_the_working_directory() {
    assert_eq!(default_config_path(), std::path::PathBuf::from("pipedag.toml"));
}
