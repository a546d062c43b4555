// src/query/mod.rs

//! The `--tasks` / `--exclude` selection language.

pub mod resolver;
pub mod selector;

pub use resolver::resolve_query;
pub use selector::{Operation, Selector, SelectorKind, is_identifier};
