// src/lib.rs

//! sitegraph: declarative build orchestration for static sites.
//!
//! A `Sitegraph.toml` file declares named tasks. Each task either routes a
//! selector-defined working set through a chain of external transforms into
//! the destination tree, or performs an action (cleanup, reporting command).
//! Tasks form a dependency DAG; invoking one task runs its transitive
//! dependencies in dependency order with bounded parallelism. `--watch`
//! keeps the process alive and re-runs tasks whose patterns match changed
//! source files, coalescing rapid changes into at most one queued re-run.

pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod graph;
pub mod logging;
pub mod paths;
pub mod select;
pub mod transform;
pub mod watch;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::context::BuildContext;
use crate::engine::core::WatchCore;
use crate::engine::runner::RealNodeRunner;
use crate::engine::runtime::Runtime;
use crate::engine::RuntimeEvent;
use crate::errors::{Result, SitegraphError};
use crate::graph::{execute_plan, resolve, ExecutionPlan, TaskGraph, TaskNode};
use crate::transform::{FileHashStore, HashStore, TransformRegistry};
use crate::watch::{build_bindings, spawn_watcher};

/// Top-level entry point: load config, resolve the requested task into a
/// plan, execute it, and optionally stay resident in watch mode.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = config::load_and_validate(&args.config)?;

    let mut ctx = BuildContext::from_config(&cfg, &args);
    ctx.bundle_config = write_bundle_config(&cfg)?;
    let ctx = Arc::new(ctx);

    let registry = TransformRegistry::from_config(&cfg)?;

    let mut nodes: HashMap<String, Arc<TaskNode>> = HashMap::new();
    for (name, tc) in cfg.task.iter() {
        let node = TaskNode::from_config(name, tc, &cfg, &registry)?;
        nodes.insert(name.clone(), Arc::new(node));
    }
    let nodes = Arc::new(nodes);

    let graph = TaskGraph::from_config(&cfg);
    let plan = resolve(&graph, &args.task)?;

    if args.dry_run {
        print_dry_run(&plan, &cfg, &ctx);
        return Ok(());
    }

    let store = open_hash_store(&cfg)?;

    info!(
        target_task = %args.task,
        tasks = plan.len(),
        env = %ctx.env.as_str(),
        "executing plan"
    );

    execute_plan(
        &plan,
        &graph,
        &nodes,
        Arc::clone(&ctx),
        Arc::clone(&store),
        cfg.default.effective_max_parallel(),
    )
    .await?;

    if args.watch {
        run_watch(&cfg, &plan, nodes, ctx, store).await?;
    }

    Ok(())
}

/// Serialize the `[bundle]` section to `<scratch>/.sitegraph/bundle.toml`
/// so bundling transforms can consume it via `{bundle_config}`. Returns
/// `None` when the config declares no modules.
fn write_bundle_config(cfg: &ConfigFile) -> Result<Option<PathBuf>> {
    if cfg.bundle.modules.is_empty() {
        return Ok(None);
    }

    let rendered = toml::to_string(&cfg.bundle)
        .map_err(|e| SitegraphError::Config(format!("serializing [bundle] section: {e}")))?;

    let dir = cfg.paths.scratch.join(".sitegraph");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("bundle.toml");
    std::fs::write(&path, rendered)?;

    info!(path = %path.display(), "wrote bundle config");
    Ok(Some(path))
}

/// Open the content-addressed hash store and prune entries for tasks no
/// longer present in the config.
fn open_hash_store(cfg: &ConfigFile) -> Result<Arc<Mutex<Box<dyn HashStore>>>> {
    let mut store: Box<dyn HashStore> = Box::new(FileHashStore::new(cfg.paths.scratch.clone()));

    let active: Vec<&str> = cfg.task.keys().map(|s| s.as_str()).collect();
    if let Err(err) = store.prune(&active) {
        // A corrupt store shouldn't block a build; worst case is a stale
        // cache miss.
        warn!(error = %err, "failed to prune hash store");
    }

    Ok(Arc::new(Mutex::new(store)))
}

/// Print the resolved plan without running anything.
fn print_dry_run(plan: &ExecutionPlan, cfg: &ConfigFile, ctx: &BuildContext) {
    println!("plan ({} tasks, env = {}):", plan.len(), ctx.env.as_str());
    for name in plan.order() {
        let Some(tc) = cfg.task.get(name) else {
            continue;
        };
        let mut desc = Vec::new();
        if !tc.clean.is_empty() {
            desc.push(format!("clean {}", tc.clean.join(", ")));
        }
        if tc.cmd.is_some() {
            desc.push("cmd".to_string());
        }
        if tc.has_selector() {
            desc.push(format!(
                "{} -> [{}]",
                tc.select.join(" "),
                tc.transforms.join(" | ")
            ));
        }
        if desc.is_empty() {
            desc.push("(aggregate)".to_string());
        }
        println!("  {name}: {}", desc.join("; "));
    }
}

/// Stay resident: watch the source root and re-run bound tasks on change
/// until Ctrl-C, letting in-flight runs finish before exiting.
async fn run_watch(
    cfg: &ConfigFile,
    plan: &ExecutionPlan,
    nodes: Arc<HashMap<String, Arc<TaskNode>>>,
    ctx: Arc<BuildContext>,
    store: Arc<Mutex<Box<dyn HashStore>>>,
) -> Result<()> {
    let bindings: Vec<_> = build_bindings(cfg)?
        .into_iter()
        .filter(|b| plan.contains(b.task()))
        .collect();

    if bindings.is_empty() {
        warn!("no watchable tasks in plan; exiting watch mode");
        return Ok(());
    }

    let (event_tx, event_rx) = mpsc::channel::<RuntimeEvent>(64);

    let _watcher = spawn_watcher(ctx.src.clone(), bindings, event_tx.clone())?;

    // Ctrl-C requests a graceful shutdown; the core drains running tasks
    // before the runtime exits.
    let shutdown_tx = event_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            let _ = shutdown_tx.send(RuntimeEvent::ShutdownRequested).await;
        }
    });

    let runner = RealNodeRunner::new(nodes, ctx, store, event_tx);
    Runtime::new(WatchCore::new(), event_rx, runner).run().await
}
