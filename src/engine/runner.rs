// src/engine/runner.rs

//! Pluggable node-runner abstraction for the watch runtime.
//!
//! The runtime talks to a `NodeRunner` instead of spawning node runs
//! directly, so tests can swap in a fake that records invocations and emits
//! `RunFinished` events without touching the filesystem.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::context::BuildContext;
use crate::engine::{RuntimeEvent, TaskName, TaskOutcome};
use crate::errors::Result;
use crate::graph::TaskNode;
use crate::transform::HashStore;

/// Trait abstracting how a watch-triggered task run is started.
///
/// Implementations must not block: `start` returns once the run has been
/// spawned, and a `RunFinished` event must eventually be emitted for it.
pub trait NodeRunner: Send {
    fn start(
        &mut self,
        task: TaskName,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production runner: executes the bound node in a spawned Tokio task and
/// reports completion back into the runtime event channel.
pub struct RealNodeRunner {
    nodes: Arc<HashMap<String, Arc<TaskNode>>>,
    ctx: Arc<BuildContext>,
    store: Arc<Mutex<Box<dyn HashStore>>>,
    event_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealNodeRunner {
    pub fn new(
        nodes: Arc<HashMap<String, Arc<TaskNode>>>,
        ctx: Arc<BuildContext>,
        store: Arc<Mutex<Box<dyn HashStore>>>,
        event_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            nodes,
            ctx,
            store,
            event_tx,
        }
    }
}

impl NodeRunner for RealNodeRunner {
    fn start(
        &mut self,
        task: TaskName,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let node = self.nodes.get(&task).cloned();
        let ctx = Arc::clone(&self.ctx);
        let store = Arc::clone(&self.store);
        let tx = self.event_tx.clone();

        Box::pin(async move {
            let Some(node) = node else {
                // Bindings are built from the same config as the node map,
                // so this only happens if they drift; report and move on.
                error!(task = %task, "watch trigger for unknown node; ignoring");
                return Ok(());
            };

            tokio::spawn(async move {
                info!(task = %task, "watch re-run starting");
                let outcome = match node.run(&ctx, &store).await {
                    Ok(_) => TaskOutcome::Success,
                    Err(err) => {
                        // Watch mode keeps serving other bindings; the
                        // failure is surfaced, not fatal.
                        error!(task = %task, error = %err, "watch re-run failed");
                        TaskOutcome::Failed
                    }
                };
                let _ = tx.send(RuntimeEvent::RunFinished { task, outcome }).await;
            });

            Ok(())
        })
    }
}
