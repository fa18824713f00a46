// src/engine/core.rs

//! Pure watch-coalescing state machine.
//!
//! The core consumes [`RuntimeEvent`]s and produces commands for the IO
//! shell. It owns no channels, no Tokio types, and performs no IO, so the
//! coalescing semantics can be unit tested synchronously.
//!
//! Invariants:
//! - invocations of the same binding serialize: a task already running is
//!   never started again until its current run finishes;
//! - rapid events for a running task coalesce into exactly one pending
//!   re-run, started when the current run completes;
//! - distinct bindings are independent and may run concurrently;
//! - after shutdown is requested no new runs start; the core reports
//!   `keep_running = false` once the last in-flight run finishes.

use std::collections::HashMap;

use tracing::debug;

use crate::engine::{RuntimeEvent, TaskName};

/// Command produced by the core, executed by the IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start a run of this task's node.
    StartRun(TaskName),
}

/// Decision returned after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingState {
    Idle,
    /// `pending` records whether another event arrived during this run.
    Running { pending: bool },
}

/// Per-binding run state plus the shutdown flag.
#[derive(Debug, Default)]
pub struct WatchCore {
    states: HashMap<TaskName, BindingState>,
    shutting_down: bool,
}

impl WatchCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of runs currently in flight.
    pub fn running_count(&self) -> usize {
        self.states
            .values()
            .filter(|s| matches!(s, BindingState::Running { .. }))
            .count()
    }

    pub fn is_idle(&self) -> bool {
        self.running_count() == 0
    }

    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::FileChanged { task } => self.on_file_changed(task),
            RuntimeEvent::RunFinished { task, .. } => self.on_run_finished(task),
            RuntimeEvent::ShutdownRequested => {
                self.shutting_down = true;
                CoreStep {
                    commands: Vec::new(),
                    keep_running: !self.is_idle(),
                }
            }
        }
    }

    fn on_file_changed(&mut self, task: TaskName) -> CoreStep {
        if self.shutting_down {
            return CoreStep {
                commands: Vec::new(),
                keep_running: !self.is_idle(),
            };
        }

        let state = self
            .states
            .entry(task.clone())
            .or_insert(BindingState::Idle);

        let commands = match state {
            BindingState::Idle => {
                *state = BindingState::Running { pending: false };
                vec![CoreCommand::StartRun(task)]
            }
            BindingState::Running { pending } => {
                debug!(task = %task, "binding already running; coalescing into one pending re-run");
                *pending = true;
                Vec::new()
            }
        };

        CoreStep {
            commands,
            keep_running: true,
        }
    }

    fn on_run_finished(&mut self, task: TaskName) -> CoreStep {
        let mut commands = Vec::new();

        let state = self
            .states
            .entry(task.clone())
            .or_insert(BindingState::Idle);

        match *state {
            BindingState::Running { pending } => {
                if pending && !self.shutting_down {
                    *state = BindingState::Running { pending: false };
                    commands.push(CoreCommand::StartRun(task));
                } else {
                    *state = BindingState::Idle;
                }
            }
            BindingState::Idle => {
                // Finish for a run we don't consider active; ignore.
            }
        }

        CoreStep {
            commands,
            keep_running: !(self.shutting_down && self.is_idle()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TaskOutcome;

    fn changed(task: &str) -> RuntimeEvent {
        RuntimeEvent::FileChanged {
            task: task.to_string(),
        }
    }

    fn finished(task: &str) -> RuntimeEvent {
        RuntimeEvent::RunFinished {
            task: task.to_string(),
            outcome: TaskOutcome::Success,
        }
    }

    #[test]
    fn idle_binding_starts_immediately() {
        let mut core = WatchCore::new();
        let step = core.step(changed("styles"));
        assert_eq!(step.commands, vec![CoreCommand::StartRun("styles".into())]);
    }

    #[test]
    fn rapid_events_coalesce_into_one_rerun() {
        let mut core = WatchCore::new();
        core.step(changed("styles"));

        // Two more events while running.
        assert!(core.step(changed("styles")).commands.is_empty());
        assert!(core.step(changed("styles")).commands.is_empty());

        // First completion starts exactly one re-run.
        let step = core.step(finished("styles"));
        assert_eq!(step.commands, vec![CoreCommand::StartRun("styles".into())]);

        // Second completion starts nothing.
        assert!(core.step(finished("styles")).commands.is_empty());
        assert!(core.is_idle());
    }

    #[test]
    fn distinct_bindings_do_not_block_each_other() {
        let mut core = WatchCore::new();
        let a = core.step(changed("styles"));
        let b = core.step(changed("scripts"));
        assert_eq!(a.commands, vec![CoreCommand::StartRun("styles".into())]);
        assert_eq!(b.commands, vec![CoreCommand::StartRun("scripts".into())]);
        assert_eq!(core.running_count(), 2);
    }

    #[test]
    fn shutdown_waits_for_in_flight_runs() {
        let mut core = WatchCore::new();
        core.step(changed("styles"));

        let step = core.step(RuntimeEvent::ShutdownRequested);
        assert!(step.keep_running, "must wait for the in-flight run");

        // New events are ignored during shutdown.
        assert!(core.step(changed("scripts")).commands.is_empty());

        let step = core.step(finished("styles"));
        assert!(!step.keep_running);
    }

    #[test]
    fn shutdown_with_nothing_running_exits_at_once() {
        let mut core = WatchCore::new();
        let step = core.step(RuntimeEvent::ShutdownRequested);
        assert!(!step.keep_running);
    }

    #[test]
    fn pending_rerun_is_dropped_on_shutdown() {
        let mut core = WatchCore::new();
        core.step(changed("styles"));
        core.step(changed("styles"));
        core.step(RuntimeEvent::ShutdownRequested);

        let step = core.step(finished("styles"));
        assert!(step.commands.is_empty(), "no re-run after shutdown");
        assert!(!step.keep_running);
    }
}
