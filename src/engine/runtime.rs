// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::core::{CoreCommand, WatchCore};
use crate::engine::runner::NodeRunner;
use crate::engine::RuntimeEvent;
use crate::errors::Result;

/// Async IO shell around [`WatchCore`].
///
/// Reads events from the channel, steps the pure core, and executes the
/// resulting commands through the pluggable [`NodeRunner`]. All coalescing
/// and shutdown semantics live in the core.
pub struct Runtime<R: NodeRunner> {
    core: WatchCore,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    runner: R,
}

impl<R: NodeRunner> fmt::Debug for Runtime<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").field("core", &self.core).finish_non_exhaustive()
    }
}

impl<R: NodeRunner> Runtime<R> {
    pub fn new(core: WatchCore, event_rx: mpsc::Receiver<RuntimeEvent>, runner: R) -> Self {
        Self {
            core,
            event_rx,
            runner,
        }
    }

    /// Main event loop: runs until shutdown completes or the channel closes.
    pub async fn run(mut self) -> Result<()> {
        info!("watch runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                match command {
                    CoreCommand::StartRun(task) => {
                        self.runner.start(task).await?;
                    }
                }
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("watch runtime exiting");
        Ok(())
    }
}
