// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::paths::RelPath;
use crate::watch::bindings::WatchBinding;

/// Handle keeping the underlying `RecommendedWatcher` alive. Dropping it
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and send `RuntimeEvent::FileChanged` for every
/// binding whose patterns match a changed path.
///
/// Coalescing of repeated triggers for a running task happens in the engine
/// core; this layer only turns paths into task-level events.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    bindings: Vec<WatchBinding>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so event paths relativize against a stable base.
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    let bindings = Arc::new(bindings);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        {
            let event_tx = event_tx.clone();
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(err) = event_tx.send(event) {
                        // tracing isn't usable from the notify thread here.
                        eprintln!("sitegraph: failed to forward notify event: {err}");
                    }
                }
                Err(err) => {
                    eprintln!("sitegraph: file watch error: {err}");
                }
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    let async_root = root.clone();
    let async_bindings = Arc::clone(&bindings);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");

            for path in event.paths {
                let Some(rel) = RelPath::relative_to(&async_root, &path) else {
                    warn!("could not relativize {:?} against {:?}", path, async_root);
                    continue;
                };

                for binding in async_bindings.iter() {
                    if !binding.matches(rel.as_str()) {
                        continue;
                    }
                    debug!(task = %binding.task(), path = %rel, "watch match -> triggering task");
                    if runtime_tx
                        .send(RuntimeEvent::FileChanged {
                            task: binding.task().to_string(),
                        })
                        .await
                        .is_err()
                    {
                        // Runtime gone; no point keeping the loop alive.
                        return;
                    }
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
