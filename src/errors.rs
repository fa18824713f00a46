// src/errors.rs

//! Crate-wide error types.
//!
//! Three broad kinds flow through the orchestrator:
//! - configuration errors (`Config`, `Cycle`, `UnknownTask`,
//!   `UnknownTransform`, `Toml`), always detected before any task runs;
//! - `Transform`: a single file failed a named transform; whether this
//!   aborts the owning task depends on the task's error policy;
//! - `Task`: a task's action failed entirely; always halts the plan.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitegraphError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cycle detected in task graph: {0}")]
    Cycle(String),

    #[error("Task not found: {0}")]
    UnknownTask(String),

    #[error("Task '{task}' references unknown transform '{transform}'")]
    UnknownTransform { task: String, transform: String },

    #[error("Transform '{transform}' failed on {path:?}: {message}")]
    Transform {
        transform: String,
        path: PathBuf,
        message: String,
    },

    #[error("Task '{task}' failed: {message}")]
    Task { task: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SitegraphError {
    /// Wrap an arbitrary cause as a task-level failure.
    pub fn task(task: impl Into<String>, message: impl Into<String>) -> Self {
        SitegraphError::Task {
            task: task.into(),
            message: message.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SitegraphError>;
