// src/graph/node.rs

//! Task nodes: the unit of work the executor dispatches.
//!
//! A node is one of:
//! - a routing node: selector → transform chain → destination subtree, with
//!   intermediate stages staged under the scratch root;
//! - an action node: `clean` directories and/or run a bare external command
//!   (reporting hooks: changelog, TODO extraction, lint reports);
//! - a pure aggregate: only `after` edges, nothing to do itself.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::config::{ConfigFile, ErrorPolicy, PathsSection, TaskConfig, TaskRoot};
use crate::context::BuildContext;
use crate::errors::{Result, SitegraphError};
use crate::fs::RealFileSystem;
use crate::paths::RelPath;
use crate::select::Selector;
use crate::transform::cache::{cache_key, compute_file_hash};
use crate::transform::{HashStore, OutputFile, Transform, TransformJob, accepts};

#[derive(Debug, Clone)]
pub struct TaskNode {
    pub name: String,
    pub deps: Vec<String>,
    pub on_error: ErrorPolicy,
    selector: Option<Selector>,
    root: TaskRoot,
    transforms: Vec<Arc<dyn Transform>>,
    dest_sub: Option<String>,
    cache: bool,
    cmd: Option<String>,
    clean: Vec<CleanEntry>,
}

/// Which managed tree a `clean` entry lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CleanRoot {
    Dest,
    Scratch,
    Docs,
}

/// A `clean` entry split into its managed root and the remainder, so the
/// removal resolves against the *effective* roots in [`BuildContext`]
/// (which CLI overrides may have moved) rather than the literal config
/// strings.
#[derive(Debug, Clone)]
struct CleanEntry {
    root: CleanRoot,
    rest: PathBuf,
}

impl CleanEntry {
    fn parse(entry: &str, paths: &PathsSection) -> Option<Self> {
        let path = Path::new(entry);
        let roots = [
            (CleanRoot::Dest, &paths.dest),
            (CleanRoot::Scratch, &paths.scratch),
            (CleanRoot::Docs, &paths.docs),
        ];
        for (root, base) in roots {
            if let Ok(rest) = path.strip_prefix(base) {
                return Some(Self {
                    root,
                    rest: rest.to_path_buf(),
                });
            }
        }
        None
    }

    fn resolve(&self, ctx: &BuildContext) -> PathBuf {
        let base = match self.root {
            CleanRoot::Dest => &ctx.dest,
            CleanRoot::Scratch => &ctx.scratch,
            CleanRoot::Docs => &ctx.docs,
        };
        base.join(&self.rest)
    }
}

impl TaskNode {
    /// Assemble a node from validated config, resolving its transform chain
    /// against the registry.
    pub fn from_config(
        name: &str,
        tc: &TaskConfig,
        cfg: &ConfigFile,
        registry: &crate::transform::TransformRegistry,
    ) -> Result<Self> {
        let selector = if tc.has_selector() {
            Some(Selector::parse(&tc.select)?)
        } else {
            None
        };

        let mut transforms = Vec::with_capacity(tc.transforms.len());
        for t in tc.transforms.iter() {
            transforms.push(registry.get(name, t)?);
        }

        let mut clean = Vec::with_capacity(tc.clean.len());
        for entry in tc.clean.iter() {
            let parsed = CleanEntry::parse(entry, &cfg.paths).ok_or_else(|| {
                SitegraphError::Config(format!(
                    "task '{name}': clean path '{entry}' is outside the dest/scratch/docs roots"
                ))
            })?;
            clean.push(parsed);
        }

        Ok(Self {
            name: name.to_string(),
            deps: tc.after.clone(),
            on_error: tc.on_error,
            selector,
            root: tc.root,
            transforms,
            dest_sub: tc.dest.clone(),
            cache: tc.effective_cache(cfg.default.cache),
            cmd: tc.cmd.clone(),
            clean,
        })
    }

    /// Run this node to completion. Returns the relative paths of the final
    /// stage's output set (empty for action nodes).
    pub async fn run(
        &self,
        ctx: &BuildContext,
        store: &Mutex<Box<dyn HashStore>>,
    ) -> Result<Vec<RelPath>> {
        for entry in &self.clean {
            self.clean_dir(entry, ctx).await?;
        }

        if let Some(cmd) = &self.cmd {
            self.run_action(cmd, ctx).await?;
        }

        match &self.selector {
            Some(selector) => self.run_pipeline(selector, ctx, store).await,
            None => Ok(Vec::new()),
        }
    }

    async fn clean_dir(&self, entry: &CleanEntry, ctx: &BuildContext) -> Result<()> {
        let path = entry.resolve(ctx);
        if !path.exists() {
            return Ok(());
        }
        info!(task = %self.name, dir = %path.display(), "removing directory");
        tokio::fs::remove_dir_all(&path).await.map_err(|e| {
            SitegraphError::task(&self.name, format!("removing '{}': {e}", path.display()))
        })
    }

    /// Run a bare external command (selector-less reporting hook).
    async fn run_action(&self, cmd: &str, ctx: &BuildContext) -> Result<()> {
        let cmd_line = ctx.substitute(cmd);
        info!(task = %self.name, cmd = %cmd_line, "running task action");

        let output = crate::transform::command::shell_command(&cmd_line)
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SitegraphError::task(&self.name, format!("spawning action: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SitegraphError::task(
                &self.name,
                format!(
                    "action exited with code {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim_end()
                ),
            ));
        }
        Ok(())
    }

    /// Feed the selector's working set through the transform chain.
    ///
    /// Intermediate stage N writes under `<scratch>/<task>/<N>/`, so an
    /// extension-preserving stage never collides with its own input and
    /// concurrent tasks never share intermediate paths; the final stage
    /// writes under the destination subtree. A file whose extension a stage
    /// does not accept is dropped from the working set. A per-file error is
    /// governed by the task's error policy, except that order-sensitive
    /// stages always abort (a partial input set would change the stage's
    /// meaning).
    async fn run_pipeline(
        &self,
        selector: &Selector,
        ctx: &BuildContext,
        store: &Mutex<Box<dyn HashStore>>,
    ) -> Result<Vec<RelPath>> {
        let input_root = match self.root {
            TaskRoot::Src => &ctx.src,
            TaskRoot::Scratch => &ctx.scratch,
        };

        let fs = RealFileSystem;
        let selected = selector.select(&fs, input_root)?;
        debug!(task = %self.name, files = selected.len(), "selected working set");

        let mut current: Vec<OutputFile> = selected
            .into_iter()
            .map(|rel| OutputFile {
                path: rel.join_under(input_root),
                rel,
            })
            .collect();

        let last_stage = self.transforms.len().saturating_sub(1);
        for (stage, transform) in self.transforms.iter().enumerate() {
            let stage_root = if stage == last_stage {
                match &self.dest_sub {
                    Some(sub) => ctx.dest.join(sub),
                    None => ctx.dest.clone(),
                }
            } else {
                ctx.scratch.join(&self.name).join(stage.to_string())
            };

            let mut next = Vec::with_capacity(current.len());
            for file in current {
                if !accepts(transform.as_ref(), &file.rel) {
                    debug!(
                        task = %self.name,
                        transform = %transform.name(),
                        file = %file.rel,
                        "extension not accepted by stage; dropping file"
                    );
                    continue;
                }
                match self
                    .run_stage_file(transform.as_ref(), file, &stage_root, ctx, store)
                    .await
                {
                    Ok(out) => next.push(out),
                    Err(err) => {
                        let abort =
                            self.on_error == ErrorPolicy::Abort || transform.order_sensitive();
                        if abort {
                            return Err(err);
                        }
                        warn!(
                            task = %self.name,
                            transform = %transform.name(),
                            error = %err,
                            "per-file transform error; skipping file"
                        );
                    }
                }
            }
            current = next;
        }

        Ok(current.into_iter().map(|f| f.rel).collect())
    }

    /// Run one transform on one file, honouring the content cache.
    async fn run_stage_file(
        &self,
        transform: &dyn Transform,
        file: OutputFile,
        stage_root: &PathBuf,
        ctx: &BuildContext,
        store: &Mutex<Box<dyn HashStore>>,
    ) -> Result<OutputFile> {
        let out_rel = match transform.output_ext() {
            Some(ext) => file.rel.with_extension(ext),
            None => file.rel.clone(),
        };
        let output = out_rel.join_under(stage_root);

        if self.cache {
            let key = cache_key(&self.name, transform.name(), &file.rel);
            let input_hash = compute_file_hash(&file.path)?;

            let unchanged = {
                let store = store
                    .lock()
                    .map_err(|_| SitegraphError::task(&self.name, "cache store poisoned"))?;
                store.load(&key)?.as_deref() == Some(input_hash.as_str())
            };

            if unchanged && output.is_file() {
                debug!(
                    task = %self.name,
                    transform = %transform.name(),
                    file = %file.rel,
                    "input unchanged and output present; skipping stage"
                );
                return Ok(OutputFile {
                    path: output,
                    rel: out_rel,
                });
            }

            let job = TransformJob {
                input: file.path,
                rel: file.rel,
                output,
            };
            let out = transform.apply(job, ctx).await?;

            let mut store = store
                .lock()
                .map_err(|_| SitegraphError::task(&self.name, "cache store poisoned"))?;
            store.save(&key, &input_hash)?;
            return Ok(OutputFile {
                path: out.path,
                rel: out_rel,
            });
        }

        let job = TransformJob {
            input: file.path,
            rel: file.rel,
            output,
        };
        let out = transform.apply(job, ctx).await?;
        Ok(OutputFile {
            path: out.path,
            rel: out_rel,
        })
    }

    pub fn has_selector(&self) -> bool {
        self.selector.is_some()
    }

    /// Patterns the watch controller binds this node to.
    pub fn selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }
}
