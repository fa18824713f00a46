// src/graph/graph.rs

use std::collections::HashMap;

use crate::config::ConfigFile;

/// Internal node structure: immediate deps and dependents.
#[derive(Debug, Clone)]
struct GraphNode {
    /// Tasks that must complete before this one starts.
    deps: Vec<String>,
    /// Tasks that list this one in their `after`.
    dependents: Vec<String>,
}

/// In-memory task adjacency keyed by task name.
///
/// Config validation already rejects unknown `after` references and cyclic
/// graphs, so this only keeps adjacency for plan resolution and failure
/// propagation.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    nodes: HashMap<String, GraphNode>,
}

impl TaskGraph {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let mut nodes: HashMap<String, GraphNode> = HashMap::new();

        for (name, task) in cfg.task.iter() {
            nodes.insert(
                name.clone(),
                GraphNode {
                    deps: task.after.clone(),
                    dependents: Vec::new(),
                },
            );
        }

        let task_names: Vec<String> = nodes.keys().cloned().collect();
        for task_name in task_names {
            let deps = nodes
                .get(&task_name)
                .map(|n| n.deps.clone())
                .unwrap_or_default();

            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(task_name.clone());
                }
            }
        }

        Self { nodes }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}
