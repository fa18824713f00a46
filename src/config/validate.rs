// src/config/validate.rs

use std::path::Path;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SitegraphError};
use crate::select::Selector;
use crate::transform::registry::BUILTIN_TRANSFORMS;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SitegraphError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_task_shapes(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_transform_references(cfg)?;
    validate_selectors(cfg)?;
    validate_clean_paths(cfg)?;
    validate_acyclic(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(SitegraphError::Config(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

/// A task is either a file-routing node (select + transforms), an action
/// node (cmd and/or clean), or a pure aggregate (only `after`).
fn validate_task_shapes(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if task.has_selector() && task.transforms.is_empty() {
            return Err(SitegraphError::Config(format!(
                "task '{name}' has `select` patterns but no `transforms` chain"
            )));
        }
        if !task.transforms.is_empty() && !task.has_selector() {
            return Err(SitegraphError::Config(format!(
                "task '{name}' has a `transforms` chain but no `select` patterns"
            )));
        }
        if task.has_selector() && (task.cmd.is_some() || !task.clean.is_empty()) {
            return Err(SitegraphError::Config(format!(
                "task '{name}' mixes a selector with `cmd`/`clean`; split it into separate tasks"
            )));
        }
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            if !cfg.task.contains_key(dep) {
                return Err(SitegraphError::Config(format!(
                    "task '{name}' has unknown dependency '{dep}' in `after`"
                )));
            }
            if dep == name {
                return Err(SitegraphError::Config(format!(
                    "task '{name}' cannot depend on itself in `after`"
                )));
            }
        }
    }
    Ok(())
}

fn validate_transform_references(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for t in task.transforms.iter() {
            if !cfg.transform.contains_key(t) && !BUILTIN_TRANSFORMS.contains(&t.as_str()) {
                return Err(SitegraphError::UnknownTransform {
                    task: name.clone(),
                    transform: t.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Compile every selector and watch pattern list once, so malformed globs
/// surface at load time rather than mid-build.
fn validate_selectors(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        Selector::parse(&task.select)
            .map_err(|e| SitegraphError::Config(format!("task '{name}': {e}")))?;
        if let Some(watch) = &task.watch {
            Selector::parse(watch)
                .map_err(|e| SitegraphError::Config(format!("task '{name}' watch: {e}")))?;
        }
    }
    Ok(())
}

/// `clean` entries may only point at the dest, scratch or docs trees.
fn validate_clean_paths(cfg: &RawConfigFile) -> Result<()> {
    let allowed = [&cfg.paths.dest, &cfg.paths.scratch, &cfg.paths.docs];

    for (name, task) in cfg.task.iter() {
        for entry in task.clean.iter() {
            let entry_path = Path::new(entry);
            let ok = allowed.iter().any(|root| entry_path.starts_with(root));
            if !ok || entry.contains("..") {
                return Err(SitegraphError::Config(format!(
                    "task '{name}': clean path '{entry}' is outside the dest/scratch/docs roots"
                )));
            }
        }
    }
    Ok(())
}

fn validate_acyclic(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: dep -> task. For:
    //   [task.bundle]
    //   after = ["compile"]
    // we add edge compile -> bundle.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(SitegraphError::Cycle(format!(
                "task graph has a cycle involving task '{node}'"
            )))
        }
    }
}
