// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level configuration as read from `Sitegraph.toml`, before semantic
/// validation.
///
/// ```toml
/// [paths]
/// src = "src"
/// dest = "wwwroot"
///
/// [transform.compile-styles]
/// cmd = "lessc {input} {output}"
/// input_ext = ["less"]
/// output_ext = "css"
///
/// [task.styles]
/// select = ["**/*.less", "!**/_*.less"]
/// transforms = ["compile-styles"]
/// ```
///
/// All sections are optional except `[task.*]` (at least one task).
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub default: DefaultSection,

    /// Module-alias metadata for bundling transforms. Opaque to the core.
    #[serde(default)]
    pub bundle: BundleSection,

    /// Named external transforms from `[transform.<name>]`.
    #[serde(default)]
    pub transform: BTreeMap<String, TransformConfig>,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated configuration. Constructed only through
/// `ConfigFile::try_from(raw)` (see `config::validate`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub paths: PathsSection,
    pub site: SiteSection,
    pub default: DefaultSection,
    pub bundle: BundleSection,
    pub transform: BTreeMap<String, TransformConfig>,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    /// Bypass validation. Only `config::validate` and test builders should
    /// call this.
    pub fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            paths: raw.paths,
            site: raw.site,
            default: raw.default,
            bundle: raw.bundle,
            transform: raw.transform,
            task: raw.task,
        }
    }
}

/// `[paths]` section: the filesystem layout contract.
///
/// - `src` is the only tree transforms read from by default;
/// - `scratch` stages intermediate output of multi-stage chains;
/// - `dest` is write-only for the core (never a transform input);
/// - `docs` receives reporting-task output.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_src")]
    pub src: PathBuf,
    #[serde(default = "default_scratch")]
    pub scratch: PathBuf,
    #[serde(default = "default_dest")]
    pub dest: PathBuf,
    #[serde(default = "default_docs")]
    pub docs: PathBuf,
}

fn default_src() -> PathBuf {
    PathBuf::from("src")
}
fn default_scratch() -> PathBuf {
    PathBuf::from("tmp")
}
fn default_dest() -> PathBuf {
    PathBuf::from("wwwroot")
}
fn default_docs() -> PathBuf {
    PathBuf::from("docs")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src: default_src(),
            scratch: default_scratch(),
            dest: default_dest(),
            docs: default_docs(),
        }
    }
}

/// `[site]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSection {
    /// Base URL handed to sitemap-generating transforms as `{site_url}`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Build mode; overridable with `--env`.
    #[serde(default)]
    pub env: EnvMode,
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            env: EnvMode::default(),
        }
    }
}

/// Build environment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvMode {
    #[default]
    Development,
    Production,
}

impl EnvMode {
    /// Value substituted for `{env}` in command templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvMode::Development => "development",
            EnvMode::Production => "production",
        }
    }
}

impl FromStr for EnvMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(EnvMode::Development),
            "production" | "prod" => Ok(EnvMode::Production),
            other => Err(format!(
                "invalid env mode: {other} (expected \"development\" or \"production\")"
            )),
        }
    }
}

/// `[default]` section: per-task defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    /// Default content-addressed cache behaviour; `None` means off.
    #[serde(default)]
    pub cache: Option<bool>,

    /// Upper bound on concurrently running tasks in a plan.
    #[serde(default)]
    pub max_parallel: Option<usize>,
}

impl DefaultSection {
    pub fn effective_max_parallel(&self) -> usize {
        self.max_parallel.unwrap_or(4).max(1)
    }
}

/// `[bundle]` section: module aliases consumed opaquely by bundling
/// transforms. Serialized back out to `<scratch>/.sitegraph/bundle.toml` and
/// exposed to command templates as `{bundle_config}`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BundleSection {
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleAlias>,
}

/// One module alias: where it resolves, what it depends on, what it exports.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModuleAlias {
    pub location: String,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub exports: Option<String>,
}

/// `[transform.<name>]` section: one external transform adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
    /// Command template. Placeholders: `{input}`, `{output}`, `{src}`,
    /// `{dest}`, `{scratch}`, `{docs}`, `{site_url}`, `{env}`,
    /// `{bundle_config}`.
    pub cmd: String,

    /// Input extensions this transform accepts (no dot). Empty = any file.
    /// Selected files with other extensions are dropped from the stage's
    /// working set without error.
    #[serde(default)]
    pub input_ext: Vec<String>,

    /// Extension of produced files; `None` keeps the input extension.
    #[serde(default)]
    pub output_ext: Option<String>,

    /// Whether the transform needs deterministic input ordering (bundlers).
    /// Selection is sorted anyway; this additionally forbids skipping files
    /// under `on_error = "skip"`, since a partial input set changes meaning.
    #[serde(default)]
    pub order_sensitive: bool,
}

/// Per-file error policy for a task's transform chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// First file error fails the task and halts the plan.
    #[default]
    Abort,
    /// Log the offending file, drop it from the output set, keep going.
    Skip,
}

/// Which tree a task's selector is evaluated against.
///
/// `dest` is deliberately not representable: the destination tree is never a
/// transform input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskRoot {
    #[default]
    Src,
    Scratch,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskConfig {
    /// Selector patterns; `!`-prefixed entries exclude. Empty = no file input.
    #[serde(default)]
    pub select: Vec<String>,

    /// Tree the selector walks. Defaults to the source root.
    #[serde(default)]
    pub root: TaskRoot,

    /// Transform chain applied to the working set, in order.
    #[serde(default)]
    pub transforms: Vec<String>,

    /// Destination subdirectory (under `[paths].dest`) for final-stage
    /// output. `None` writes at the dest root.
    #[serde(default)]
    pub dest: Option<String>,

    /// Dependency list: this task runs only after all of these.
    #[serde(default)]
    pub after: Vec<String>,

    #[serde(default)]
    pub on_error: ErrorPolicy,

    /// Per-task cache override; falls back to `[default].cache`.
    #[serde(default)]
    pub cache: Option<bool>,

    /// Watch patterns for this task; falls back to `select`.
    #[serde(default)]
    pub watch: Option<Vec<String>>,

    /// Directories to remove, for cleanup tasks. Must resolve inside the
    /// dest, scratch or docs roots.
    #[serde(default)]
    pub clean: Vec<String>,

    /// Bare external command for selector-less reporting/doc tasks
    /// (changelog, TODO extraction, lint reports). Supports the same
    /// placeholders as transform templates, minus `{input}`/`{output}`.
    #[serde(default)]
    pub cmd: Option<String>,
}

impl TaskConfig {
    /// Effective cache flag given the `[default]` section.
    pub fn effective_cache(&self, default_cache: Option<bool>) -> bool {
        self.cache.or(default_cache).unwrap_or(false)
    }

    /// Whether this task has any file-set input at all.
    pub fn has_selector(&self) -> bool {
        !self.select.is_empty()
    }
}
