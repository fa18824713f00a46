// src/watch/bindings.rs

use std::fmt;

use crate::config::{ConfigFile, TaskRoot};
use crate::errors::Result;
use crate::select::Selector;

/// One selector-to-task mapping for the watch controller.
///
/// A task's `watch` patterns take priority; a source-rooted task without
/// them is bound to its `select` patterns. Scratch-rooted tasks never fall
/// back: their `select` patterns are scratch-relative, while the watcher
/// reports source-relative paths, so they are only watchable through
/// explicit `watch` patterns. Tasks with neither (pure actions/aggregates)
/// get no binding. Matching a binding re-invokes only the bound task,
/// nothing downstream, unless the author declares another binding for it.
#[derive(Clone)]
pub struct WatchBinding {
    task: String,
    selector: Selector,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Whether a source-root-relative path should trigger this binding.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.selector.matches(rel_path)
    }
}

/// Compile a binding for every watchable task in the config.
///
/// Patterns were already syntax-checked at validation time, so a parse
/// failure here indicates a bug rather than bad user input.
pub fn build_bindings(cfg: &ConfigFile) -> Result<Vec<WatchBinding>> {
    let mut bindings = Vec::new();

    for (name, task) in cfg.task.iter() {
        let patterns = match (&task.watch, task.root) {
            (Some(watch), _) => watch.as_slice(),
            (None, TaskRoot::Src) => task.select.as_slice(),
            (None, TaskRoot::Scratch) => &[],
        };
        if patterns.is_empty() {
            continue;
        }
        let selector = Selector::parse(patterns)?;
        bindings.push(WatchBinding {
            task: name.clone(),
            selector,
        });
    }

    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFile, RawConfigFile, TaskConfig};
    use std::collections::BTreeMap;

    fn cfg_with(task: BTreeMap<String, TaskConfig>) -> ConfigFile {
        ConfigFile::new_unchecked(RawConfigFile {
            paths: Default::default(),
            site: Default::default(),
            default: Default::default(),
            bundle: Default::default(),
            transform: BTreeMap::new(),
            task,
        })
    }

    #[test]
    fn watch_patterns_override_selector_patterns() {
        let mut tasks = BTreeMap::new();
        tasks.insert(
            "styles".to_string(),
            TaskConfig {
                select: vec!["**/*.less".to_string()],
                transforms: vec!["copy".to_string()],
                watch: Some(vec!["styles/**/*.less".to_string()]),
                ..TaskConfig::default()
            },
        );

        let bindings = build_bindings(&cfg_with(tasks)).unwrap();
        assert_eq!(bindings.len(), 1);
        assert!(bindings[0].matches("styles/site.less"));
        assert!(!bindings[0].matches("pages/site.less"));
    }

    #[test]
    fn selector_patterns_are_the_fallback() {
        let mut tasks = BTreeMap::new();
        tasks.insert(
            "scripts".to_string(),
            TaskConfig {
                select: vec!["**/*.ts".to_string(), "!**/*.d.ts".to_string()],
                transforms: vec!["copy".to_string()],
                ..TaskConfig::default()
            },
        );

        let bindings = build_bindings(&cfg_with(tasks)).unwrap();
        assert!(bindings[0].matches("app/main.ts"));
        assert!(!bindings[0].matches("app/main.d.ts"));
    }

    #[test]
    fn action_tasks_get_no_binding() {
        let mut tasks = BTreeMap::new();
        tasks.insert(
            "clean".to_string(),
            TaskConfig {
                clean: vec!["wwwroot".to_string()],
                ..TaskConfig::default()
            },
        );

        assert!(build_bindings(&cfg_with(tasks)).unwrap().is_empty());
    }

    #[test]
    fn scratch_rooted_tasks_do_not_fall_back_to_selector_patterns() {
        let mut tasks = BTreeMap::new();
        tasks.insert(
            "bundle".to_string(),
            TaskConfig {
                select: vec!["js/**/*.js".to_string()],
                transforms: vec!["copy".to_string()],
                root: TaskRoot::Scratch,
                ..TaskConfig::default()
            },
        );

        // The select patterns are scratch-relative; binding them to
        // src-relative watch events would misfire.
        assert!(build_bindings(&cfg_with(tasks)).unwrap().is_empty());
    }

    #[test]
    fn scratch_rooted_tasks_bind_through_explicit_watch_patterns() {
        let mut tasks = BTreeMap::new();
        tasks.insert(
            "bundle".to_string(),
            TaskConfig {
                select: vec!["js/**/*.js".to_string()],
                transforms: vec!["copy".to_string()],
                root: TaskRoot::Scratch,
                watch: Some(vec!["scripts/**/*.ts".to_string()]),
                ..TaskConfig::default()
            },
        );

        let bindings = build_bindings(&cfg_with(tasks)).unwrap();
        assert_eq!(bindings.len(), 1);
        assert!(bindings[0].matches("scripts/app.ts"));
        assert!(!bindings[0].matches("js/app.js"));
    }
}
