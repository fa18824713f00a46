// src/engine/mod.rs

//! Watch-mode orchestration engine.
//!
//! Filesystem events become [`RuntimeEvent`]s; the pure core in [`core`]
//! decides which task runs to start (coalescing re-triggers of a running
//! task into a single pending re-run), and the async shell in [`runtime`]
//! performs the IO: spawning node runs and handling shutdown.

pub mod core;
pub mod runner;
pub mod runtime;

pub use core::{CoreCommand, CoreStep, WatchCore};
pub use runner::{NodeRunner, RealNodeRunner};
pub use runtime::Runtime;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Outcome of one watch-triggered task run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// Events flowing into the watch runtime.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A filesystem change matched this task's watch binding.
    FileChanged { task: TaskName },
    /// A previously started run finished.
    RunFinished { task: TaskName, outcome: TaskOutcome },
    /// Graceful shutdown requested (Ctrl-C).
    ShutdownRequested,
}
