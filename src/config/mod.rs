// src/config/mod.rs

//! Project configuration for pipedag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a project file from disk (`loader.rs`).
//! - Check its basic shape (`validate.rs`).
//! - Resolve preset inheritance and build task descriptors (`preset.rs`),
//!   on top of the generic overlay merge (`overlay.rs`).

pub mod loader;
pub mod model;
pub mod overlay;
pub mod preset;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_from_str};
pub use model::{GroupConfig, ProjectFile, RawProjectFile};
pub use overlay::{Overlay, OverlayError, merge_tables, resolve_overlays};
pub use preset::{PresetKey, resolve_presets, resolve_tasks};
