//! Builders for assembling validated-shaped configs in tests without going
//! through TOML. `build()` bypasses validation, so tests that exercise
//! validation itself should go through `config::load_and_validate` instead.

use std::collections::BTreeMap;

use sitegraph::config::{
    BundleSection, ConfigFile, DefaultSection, ErrorPolicy, PathsSection, RawConfigFile,
    SiteSection, TaskConfig, TransformConfig,
};

pub struct ConfigFileBuilder {
    paths: PathsSection,
    site: SiteSection,
    default: DefaultSection,
    transform: BTreeMap<String, TransformConfig>,
    task: BTreeMap<String, TaskConfig>,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            paths: PathsSection::default(),
            site: SiteSection::default(),
            default: DefaultSection::default(),
            transform: BTreeMap::new(),
            task: BTreeMap::new(),
        }
    }

    pub fn with_paths(mut self, paths: PathsSection) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_default_cache(mut self, cache: bool) -> Self {
        self.default.cache = Some(cache);
        self
    }

    pub fn with_transform(mut self, name: &str, cfg: TransformConfig) -> Self {
        self.transform.insert(name.to_string(), cfg);
        self
    }

    pub fn with_task(mut self, name: &str, cfg: TaskConfig) -> Self {
        self.task.insert(name.to_string(), cfg);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::new_unchecked(RawConfigFile {
            paths: self.paths,
            site: self.site,
            default: self.default,
            bundle: BundleSection::default(),
            transform: self.transform,
            task: self.task,
        })
    }
}

pub struct TaskConfigBuilder {
    cfg: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: TaskConfig::default(),
        }
    }

    pub fn select(mut self, patterns: &[&str]) -> Self {
        self.cfg.select = patterns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn transforms(mut self, names: &[&str]) -> Self {
        self.cfg.transforms = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn dest(mut self, sub: &str) -> Self {
        self.cfg.dest = Some(sub.to_string());
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.cfg.after.push(dep.to_string());
        self
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.cfg.cmd = Some(cmd.to_string());
        self
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.cfg.on_error = policy;
        self
    }

    pub fn cache(mut self, cache: bool) -> Self {
        self.cfg.cache = Some(cache);
        self
    }

    pub fn clean(mut self, entries: &[&str]) -> Self {
        self.cfg.clean = entries.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> TaskConfig {
        self.cfg
    }
}

/// Shorthand for an external command transform.
pub fn command_transform(cmd: &str) -> TransformConfig {
    TransformConfig {
        cmd: cmd.to_string(),
        input_ext: Vec::new(),
        output_ext: None,
        order_sensitive: false,
    }
}
