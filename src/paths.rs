// src/paths.rs

//! Path normalization used throughout the crate.
//!
//! Selectors, watch bindings and the transform cache all key on paths
//! *relative to a root*, with forward slashes on every platform. `RelPath`
//! is that representation; constructing one is the only place separator
//! normalization happens.

use std::fmt;
use std::path::{Path, PathBuf};

/// A root-relative path with forward-slash separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelPath(String);

impl RelPath {
    /// Build from an already-relative path, normalizing separators.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let s = path.as_ref().to_string_lossy().replace('\\', "/");
        RelPath(s)
    }

    /// Relativize `path` against `root`. Returns `None` if `path` is not
    /// under `root` even after canonicalizing both sides.
    pub fn relative_to(root: &Path, path: &Path) -> Option<Self> {
        // Fast path: the path already starts with our root.
        if let Ok(rel) = path.strip_prefix(root) {
            return Some(RelPath::new(rel));
        }

        // Canonicalize both and retry; helps when the watcher reports events
        // under a different absolute prefix for the same directory (symlinks,
        // /private/var on macOS).
        if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
            if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
                return Some(RelPath::new(rel));
            }
        }

        None
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve back to an absolute path under `root`.
    pub fn join_under(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }

    /// Extension of the final component, without the dot.
    pub fn extension(&self) -> Option<&str> {
        let name = self.0.rsplit('/').next()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            // dotfiles like ".gitignore" have no extension
            return None;
        }
        Some(ext)
    }

    /// Same path with the extension replaced (or appended when there is none).
    pub fn with_extension(&self, ext: &str) -> RelPath {
        match self.0.rsplit_once('/') {
            Some((dir, name)) => {
                let new_name = replace_ext(name, ext);
                RelPath(format!("{dir}/{new_name}"))
            }
            None => RelPath(replace_ext(&self.0, ext)),
        }
    }
}

fn replace_ext(name: &str, ext: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{stem}.{ext}"),
        _ => format!("{name}.{ext}"),
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelPath {
    fn from(s: &str) -> Self {
        RelPath::new(s)
    }
}
