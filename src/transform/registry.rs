// src/transform/registry.rs

//! Explicit name → transform registry, resolved once at startup.
//!
//! Every transform a task may reference is either a `[transform.<name>]`
//! config section (external command) or one of the built-ins. Config
//! validation checks references against the same name set, so by the time a
//! plan executes, `get` cannot fail for a validated config.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ConfigFile;
use crate::errors::{Result, SitegraphError};
use crate::transform::{CommandTransform, CopyTransform, Transform};

/// Names available without a `[transform.<name>]` declaration.
pub const BUILTIN_TRANSFORMS: &[&str] = &["copy"];

pub struct TransformRegistry {
    map: HashMap<String, Arc<dyn Transform>>,
}

impl TransformRegistry {
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let mut map: HashMap<String, Arc<dyn Transform>> = HashMap::new();

        map.insert("copy".to_string(), Arc::new(CopyTransform));

        for (name, tc) in cfg.transform.iter() {
            if map.contains_key(name) {
                return Err(SitegraphError::Config(format!(
                    "transform '{name}' shadows a built-in transform"
                )));
            }
            map.insert(
                name.clone(),
                Arc::new(CommandTransform::from_config(name, tc)),
            );
        }

        Ok(Self { map })
    }

    /// Resolve a transform for a task. Unknown names are configuration
    /// errors naming the referencing task.
    pub fn get(&self, task: &str, name: &str) -> Result<Arc<dyn Transform>> {
        self.map
            .get(name)
            .cloned()
            .ok_or_else(|| SitegraphError::UnknownTransform {
                task: task.to_string(),
                transform: name.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(|s| s.as_str())
    }
}
