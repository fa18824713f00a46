// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - [`model`] maps `Sitegraph.toml` onto serde structs.
//! - [`loader`] reads the file; [`loader::load_and_validate`] is the
//!   orchestrator's entry point.
//! - [`validate`] holds the `RawConfigFile` → `ConfigFile` conversion with
//!   all fail-fast checks.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    BundleSection, ConfigFile, DefaultSection, EnvMode, ErrorPolicy, ModuleAlias, PathsSection,
    RawConfigFile, SiteSection, TaskConfig, TaskRoot, TransformConfig,
};
