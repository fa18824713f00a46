// src/select.rs

//! Selector engine: glob-based file-set filtering.
//!
//! A selector is an ordered list of patterns; patterns starting with `!` are
//! exclusions. Matching rules:
//!
//! - a path is selected when it matches at least one inclusion pattern and
//!   **no** exclusion pattern; exclusion has absolute priority, regardless
//!   of declaration order;
//! - a selector with zero inclusion patterns selects nothing (never
//!   "everything");
//! - malformed patterns fail at [`Selector::parse`] time, which the config
//!   validator calls during load, so a bad glob never reaches execution.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::{Result, SitegraphError};
use crate::fs::FileSystem;
use crate::paths::RelPath;

/// Compiled include/exclude glob sets for one task.
#[derive(Clone)]
pub struct Selector {
    patterns: Vec<String>,
    include_set: GlobSet,
    include_count: usize,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl Selector {
    /// Compile a pattern list. `!`-prefixed entries are exclusions.
    pub fn parse(patterns: &[String]) -> Result<Self> {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();

        for pat in patterns {
            match pat.strip_prefix('!') {
                Some(rest) => excludes.push(rest.to_string()),
                None => includes.push(pat.clone()),
            }
        }

        let include_set = build_globset(&includes)?;
        let exclude_set = if excludes.is_empty() {
            None
        } else {
            Some(build_globset(&excludes)?)
        };

        Ok(Self {
            patterns: patterns.to_vec(),
            include_set,
            include_count: includes.len(),
            exclude_set,
        })
    }

    /// Original pattern list, as declared in config.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether a root-relative path belongs to this selector's working set.
    pub fn matches(&self, rel_path: &str) -> bool {
        if self.include_count == 0 {
            return false;
        }
        if !self.include_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }

    /// Collect all files under `root` matching this selector, as sorted
    /// relative paths. Sorting keeps downstream transform input ordering
    /// deterministic for order-sensitive adapters.
    pub fn select(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<RelPath>> {
        let mut files = Vec::new();

        if self.include_count == 0 || !fs.is_dir(root) {
            return Ok(files);
        }

        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for path in fs
                .read_dir(&dir)
                .with_context(|| format!("walking source tree under {:?}", root))?
            {
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) {
                    if let Some(rel) = RelPath::relative_to(root, &path) {
                        if self.matches(rel.as_str()) {
                            files.push(rel);
                        }
                    }
                }
            }
        }

        files.sort();
        Ok(files)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)
            .map_err(|e| SitegraphError::Config(format!("invalid glob pattern '{pat}': {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| SitegraphError::Config(format!("building glob set: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn sel(patterns: &[&str]) -> Selector {
        let patterns: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        Selector::parse(&patterns).unwrap()
    }

    #[test]
    fn exclusion_beats_inclusion_in_either_order() {
        let a = sel(&["src/**/*.ts", "!src/**/*.d.ts"]);
        let b = sel(&["!src/**/*.d.ts", "src/**/*.ts"]);
        for s in [&a, &b] {
            assert!(s.matches("src/a.ts"));
            assert!(!s.matches("src/a.d.ts"));
        }
    }

    #[test]
    fn zero_includes_selects_nothing() {
        let s = sel(&["!src/**/*.tmp"]);
        assert!(!s.matches("src/main.ts"));
        assert!(!s.matches("anything/at/all"));
    }

    #[test]
    fn malformed_pattern_fails_at_parse_time() {
        let patterns = vec!["src/[".to_string()];
        assert!(matches!(
            Selector::parse(&patterns),
            Err(SitegraphError::Config(_))
        ));
    }

    #[test]
    fn select_walks_tree_and_applies_both_sets() {
        let fs = MockFileSystem::new();
        fs.add_file("root/src/a.ts");
        fs.add_file("root/src/a.d.ts");
        fs.add_file("root/src/sub/b.ts");
        fs.add_file("root/readme.md");

        let s = sel(&["src/**/*.ts", "!src/**/*.d.ts"]);
        let got = s.select(&fs, Path::new("root")).unwrap();
        let got: Vec<&str> = got.iter().map(|p| p.as_str()).collect();
        assert_eq!(got, vec!["src/a.ts", "src/sub/b.ts"]);
    }

    #[test]
    fn select_on_missing_root_is_empty() {
        let fs = MockFileSystem::new();
        let s = sel(&["**/*.css"]);
        assert!(s.select(&fs, Path::new("nope")).unwrap().is_empty());
    }
}
