// src/graph/plan.rs

//! Execution plan resolution.
//!
//! `resolve` walks the dependency graph depth-first from the requested task,
//! emitting dependencies before dependents. Three-color traversal: a node
//! seen while still in progress means a cycle, reported with the full path.
//! A node reachable via several paths (diamond) is emitted exactly once.

use std::collections::HashMap;

use crate::errors::{Result, SitegraphError};
use crate::graph::graph::TaskGraph;

/// Dependency-ordered list of task names, deps first, each at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    order: Vec<String>,
}

impl ExecutionPlan {
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, name: &str) -> bool {
        self.order.iter().any(|t| t == name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    InProgress,
    Done,
}

/// Resolve the minimal plan needed to run `requested`.
pub fn resolve(graph: &TaskGraph, requested: &str) -> Result<ExecutionPlan> {
    if !graph.contains(requested) {
        return Err(SitegraphError::UnknownTask(requested.to_string()));
    }

    let mut colors: HashMap<&str, Color> = HashMap::new();
    let mut order = Vec::new();
    let mut path: Vec<String> = Vec::new();

    visit(graph, requested, &mut colors, &mut order, &mut path)?;

    Ok(ExecutionPlan { order })
}

fn visit<'g>(
    graph: &'g TaskGraph,
    name: &'g str,
    colors: &mut HashMap<&'g str, Color>,
    order: &mut Vec<String>,
    path: &mut Vec<String>,
) -> Result<()> {
    match colors.get(name).copied().unwrap_or(Color::Unvisited) {
        Color::Done => return Ok(()),
        Color::InProgress => {
            // Close the loop in the reported path for readability.
            let mut cycle: Vec<&str> = path.iter().map(|s| s.as_str()).collect();
            cycle.push(name);
            return Err(SitegraphError::Cycle(cycle.join(" -> ")));
        }
        Color::Unvisited => {}
    }

    colors.insert(name, Color::InProgress);
    path.push(name.to_string());

    for dep in graph.dependencies_of(name) {
        visit(graph, dep, colors, order, path)?;
    }

    path.pop();
    colors.insert(name, Color::Done);
    order.push(name.to_string());

    Ok(())
}
