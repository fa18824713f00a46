// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file and return the raw, unvalidated model.
///
/// This only performs TOML deserialization; semantic validation (graph
/// acyclicity, selector syntax, reference checks) lives in
/// [`load_and_validate`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file and run full validation.
///
/// This is the entry point the orchestrator uses:
///
/// - reads TOML, applying serde defaults;
/// - rejects unknown `after` / transform references, self-dependencies,
///   cyclic graphs, malformed selector and watch globs, and `clean` entries
///   escaping the dest/scratch/docs roots.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw)?;
    Ok(config)
}
