// src/watch/mod.rs

//! File watching.
//!
//! - [`bindings`] compiles selector-to-task mappings from the config.
//! - [`watcher`] wires a cross-platform filesystem watcher (`notify`) and
//!   turns matching change events into task-level runtime events.
//!
//! This module knows nothing about the task graph; a binding re-invokes
//! only its own task.

pub mod bindings;
pub mod watcher;

pub use bindings::{WatchBinding, build_bindings};
pub use watcher::{WatcherHandle, spawn_watcher};
