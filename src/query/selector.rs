// src/query/selector.rs

//! Parsing of task-selection strings.
//!
//! ```text
//! name          the task `name`
//! +name         `name` and everything upstream of it
//! name+         `name` and everything downstream of it
//! +name+        both
//! tag:name      every task tagged `name`
//! group:name    every task in group `name`
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::QueryError;

const IDENT: &str = "[A-Za-z0-9][-_A-Za-z0-9]*";

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{IDENT}$")).expect("identifier regex is valid"));

static TASK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?P<up>\+)?(?P<name>{IDENT})(?P<down>\+)?$"))
        .expect("task selector regex is valid")
});

static SCOPED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^(?P<kind>tag|group):(?P<name>{IDENT})$"))
        .expect("scoped selector regex is valid")
});

/// Whether `name` can appear in a selector.
pub fn is_identifier(name: &str) -> bool {
    IDENT_RE.is_match(name)
}

/// What a selector's name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    Task,
    Tag,
    Group,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorKind::Task => write!(f, "task"),
            SelectorKind::Tag => write!(f, "tag"),
            SelectorKind::Group => write!(f, "group"),
        }
    }
}

/// Whether a selector adds to or removes from the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Include,
    Exclude,
}

/// One parsed selection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub operation: Operation,
    pub kind: SelectorKind,
    pub name: String,
    /// Also select every ancestor (`+name`).
    pub upstream: bool,
    /// Also select every descendant (`name+`).
    pub downstream: bool,
}

impl Selector {
    pub fn parse(input: &str, operation: Operation) -> Result<Self, QueryError> {
        if let Some(caps) = SCOPED_RE.captures(input) {
            let kind = match &caps["kind"] {
                "tag" => SelectorKind::Tag,
                _ => SelectorKind::Group,
            };
            return Ok(Self {
                operation,
                kind,
                name: caps["name"].to_string(),
                upstream: false,
                downstream: false,
            });
        }

        if let Some(caps) = TASK_RE.captures(input) {
            return Ok(Self {
                operation,
                kind: SelectorKind::Task,
                name: caps["name"].to_string(),
                upstream: caps.name("up").is_some(),
                downstream: caps.name("down").is_some(),
            });
        }

        Err(QueryError::Syntax {
            selector: input.to_string(),
        })
    }

    /// The same selector narrowed to one task, keeping the closure flags.
    pub(crate) fn for_task(&self, task: &str) -> Self {
        Self {
            operation: self.operation,
            kind: SelectorKind::Task,
            name: task.to_string(),
            upstream: self.upstream,
            downstream: self.downstream,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SelectorKind::Task => write!(
                f,
                "{}{}{}",
                if self.upstream { "+" } else { "" },
                self.name,
                if self.downstream { "+" } else { "" }
            ),
            kind => write!(f, "{kind}:{}", self.name),
        }
    }
}
