// src/context.rs

//! Immutable build context handed to every task and transform.
//!
//! All ambient knobs (roots, environment mode, site URL) are resolved once at
//! startup from config + CLI overrides; nothing downstream consults globals.

use std::path::PathBuf;

use crate::cli::CliArgs;
use crate::config::{ConfigFile, EnvMode};

#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Source root: the only tree selectors walk by default.
    pub src: PathBuf,
    /// Intermediate root for multi-stage transform chains.
    pub scratch: PathBuf,
    /// Destination root. Write-only for the core.
    pub dest: PathBuf,
    /// Report output root.
    pub docs: PathBuf,
    pub env: EnvMode,
    /// Base URL substituted for `{site_url}` (sitemap generators).
    pub site_url: String,
    /// Serialized `[bundle]` config, when the config declares modules.
    /// Substituted for `{bundle_config}` in command templates.
    pub bundle_config: Option<PathBuf>,
}

impl BuildContext {
    /// Resolve the context from validated config plus CLI overrides.
    pub fn from_config(cfg: &ConfigFile, args: &CliArgs) -> Self {
        let src = args
            .src
            .clone()
            .unwrap_or_else(|| cfg.paths.src.clone());
        let dest = args
            .dest
            .clone()
            .unwrap_or_else(|| cfg.paths.dest.clone());
        let env = args.env.unwrap_or(cfg.site.env);
        let site_url = args
            .site_url
            .clone()
            .unwrap_or_else(|| cfg.site.base_url.clone());

        Self {
            src,
            scratch: cfg.paths.scratch.clone(),
            dest,
            docs: cfg.paths.docs.clone(),
            env,
            site_url,
            bundle_config: None,
        }
    }

    /// Substitute the context placeholders shared by all command templates.
    pub fn substitute(&self, template: &str) -> String {
        let bundle = self
            .bundle_config
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        template
            .replace("{src}", &self.src.to_string_lossy())
            .replace("{scratch}", &self.scratch.to_string_lossy())
            .replace("{dest}", &self.dest.to_string_lossy())
            .replace("{docs}", &self.docs.to_string_lossy())
            .replace("{env}", self.env.as_str())
            .replace("{site_url}", &self.site_url)
            .replace("{bundle_config}", &bundle)
    }
}
