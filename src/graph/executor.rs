// src/graph/executor.rs

//! Plan execution.
//!
//! Nodes run with bounded parallelism: a node is dispatched once every
//! dependency has completed successfully (dependency completion is the
//! synchronization barrier), independent branches run concurrently. On the
//! first failure no further nodes are dispatched, in-flight nodes finish,
//! transitive dependents of the failed node are marked failed without
//! running, and the first failure propagates to the orchestrator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::context::BuildContext;
use crate::errors::{Result, SitegraphError};
use crate::graph::graph::TaskGraph;
use crate::graph::node::TaskNode;
use crate::graph::plan::ExecutionPlan;
use crate::transform::HashStore;

/// Per-plan state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Pending,
    Running,
    DoneSuccess,
    DoneFailed,
}

pub async fn execute_plan(
    plan: &ExecutionPlan,
    graph: &TaskGraph,
    nodes: &HashMap<String, Arc<TaskNode>>,
    ctx: Arc<BuildContext>,
    store: Arc<Mutex<Box<dyn HashStore>>>,
    max_parallel: usize,
) -> Result<()> {
    let max_parallel = max_parallel.max(1);

    let mut states: HashMap<String, RunState> = plan
        .order()
        .iter()
        .map(|name| (name.clone(), RunState::Pending))
        .collect();

    let mut join_set: JoinSet<(String, Result<()>)> = JoinSet::new();
    let mut running = 0usize;
    let mut halted = false;
    let mut first_failure: Option<SitegraphError> = None;

    loop {
        if !halted {
            dispatch_ready(
                plan,
                nodes,
                &mut states,
                &mut join_set,
                &mut running,
                max_parallel,
                &ctx,
                &store,
            );
        }

        if running == 0 {
            break;
        }

        // Completion of any in-flight node may unblock dependents.
        match join_set.join_next().await {
            Some(Ok((name, result))) => {
                running -= 1;
                match result {
                    Ok(()) => {
                        debug!(task = %name, "task completed");
                        states.insert(name, RunState::DoneSuccess);
                    }
                    Err(err) => {
                        warn!(task = %name, error = %err, "task failed; halting plan");
                        states.insert(name.clone(), RunState::DoneFailed);
                        fail_dependents(graph, &mut states, &name);
                        if first_failure.is_none() {
                            first_failure = Some(err);
                        }
                        halted = true;
                    }
                }
            }
            Some(Err(join_err)) => {
                running -= 1;
                if first_failure.is_none() {
                    first_failure = Some(SitegraphError::task(
                        "<executor>",
                        format!("task panicked: {join_err}"),
                    ));
                }
                halted = true;
            }
            None => break,
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => {
            info!(tasks = plan.len(), "plan completed");
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn dispatch_ready(
    plan: &ExecutionPlan,
    nodes: &HashMap<String, Arc<TaskNode>>,
    states: &mut HashMap<String, RunState>,
    join_set: &mut JoinSet<(String, Result<()>)>,
    running: &mut usize,
    max_parallel: usize,
    ctx: &Arc<BuildContext>,
    store: &Arc<Mutex<Box<dyn HashStore>>>,
) {
    for name in plan.order() {
        if *running >= max_parallel {
            break;
        }
        if states.get(name) != Some(&RunState::Pending) {
            continue;
        }

        let node = match nodes.get(name) {
            Some(n) => Arc::clone(n),
            None => continue,
        };

        let deps_done = node
            .deps
            .iter()
            .all(|dep| states.get(dep) == Some(&RunState::DoneSuccess));
        if !deps_done {
            continue;
        }

        debug!(task = %name, "dependencies satisfied; dispatching");
        states.insert(name.clone(), RunState::Running);
        *running += 1;

        let ctx = Arc::clone(ctx);
        let store = Arc::clone(store);
        let task_name = name.clone();
        join_set.spawn(async move {
            let result = node.run(&ctx, &store).await.map(|_outputs| ());
            (task_name, result)
        });
    }
}

/// Mark every transitive dependent of `failed` that is still pending as
/// failed, so the final report reflects what never got to run.
fn fail_dependents(graph: &TaskGraph, states: &mut HashMap<String, RunState>, failed: &str) {
    let mut stack: Vec<String> = graph.dependents_of(failed).to_vec();

    while let Some(name) = stack.pop() {
        if states.get(&name) == Some(&RunState::Pending) {
            debug!(task = %name, upstream = %failed, "marking dependent failed without running");
            states.insert(name.clone(), RunState::DoneFailed);
            stack.extend(graph.dependents_of(&name).iter().cloned());
        }
    }
}
