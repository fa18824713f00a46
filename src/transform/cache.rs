// src/transform/cache.rs

//! Content-addressed transform cache.
//!
//! Keyed by `task/transform/relpath`, valued by the blake3 hash of the input
//! file. A stage is skipped when the stored hash matches the current input
//! *and* the expected output file already exists, which makes re-running a
//! plan over an unchanged tree byte-idempotent.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use blake3::Hasher;
use tracing::{debug, info};

use crate::errors::Result;
use crate::paths::RelPath;

/// Relative path (from the scratch root) to the hashes file.
pub const HASH_FILE_PATH: &str = ".sitegraph/hashes";

/// Cache key for one file at one chain stage.
pub fn cache_key(task: &str, transform: &str, rel: &RelPath) -> String {
    format!("{task}/{transform}/{rel}")
}

/// blake3 hash of a single file's content.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file =
        File::open(path).with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Abstract storage for cache hashes.
pub trait HashStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, hash: &str) -> Result<()>;
    /// Remove entries whose task component is not in `active_tasks`.
    fn prune(&mut self, active_tasks: &[&str]) -> Result<()>;
}

/// Stores hashes in `<scratch>/.sitegraph/hashes`, one `key hash` per line.
pub struct FileHashStore {
    scratch: PathBuf,
}

impl FileHashStore {
    pub fn new(scratch: PathBuf) -> Self {
        Self { scratch }
    }

    fn file_path(&self) -> PathBuf {
        self.scratch.join(HASH_FILE_PATH)
    }
}

impl HashStore for FileHashStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let map = load_all_hashes(&self.file_path())?;
        Ok(map.get(key).cloned())
    }

    fn save(&mut self, key: &str, hash: &str) -> Result<()> {
        let path = self.file_path();
        let mut map = load_all_hashes(&path)?;
        map.insert(key.to_string(), hash.to_string());
        save_all_hashes(&path, &map)?;
        debug!(key = %key, hash = %hash, "stored cache hash (file)");
        Ok(())
    }

    fn prune(&mut self, active_tasks: &[&str]) -> Result<()> {
        let path = self.file_path();
        let mut map = load_all_hashes(&path)?;
        let initial_len = map.len();
        map.retain(|k, _| {
            k.split('/')
                .next()
                .map(|task| active_tasks.contains(&task))
                .unwrap_or(false)
        });

        if map.len() < initial_len {
            save_all_hashes(&path, &map)?;
            info!(removed = initial_len - map.len(), "pruned stale cache entries");
        }
        Ok(())
    }
}

/// In-memory store; used in tests and useful for one-shot builds.
#[derive(Default)]
pub struct MemoryHashStore {
    map: HashMap<String, String>,
}

impl MemoryHashStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashStore for MemoryHashStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.get(key).cloned())
    }

    fn save(&mut self, key: &str, hash: &str) -> Result<()> {
        self.map.insert(key.to_string(), hash.to_string());
        Ok(())
    }

    fn prune(&mut self, active_tasks: &[&str]) -> Result<()> {
        self.map.retain(|k, _| {
            k.split('/')
                .next()
                .map(|task| active_tasks.contains(&task))
                .unwrap_or(false)
        });
        Ok(())
    }
}

fn load_all_hashes(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let file = File::open(path).with_context(|| format!("opening hash file at {:?}", path))?;
    let reader = BufReader::new(file);

    let mut map = HashMap::new();
    for line_res in reader.lines() {
        let line = line_res?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some((key, hash)) = trimmed.split_once(char::is_whitespace) {
            map.insert(key.to_string(), hash.trim().to_string());
        }
    }

    Ok(map)
}

fn save_all_hashes(path: &Path, map: &HashMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating cache directory at {:?}", parent))?;
    }

    let file = File::create(path).with_context(|| format!("creating hash file at {:?}", path))?;
    let mut writer = BufWriter::new(file);

    for (key, hash) in map.iter() {
        writeln!(writer, "{} {}", key, hash)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip_and_prune() {
        let mut store = MemoryHashStore::new();
        store.save("styles/compile-styles/a.less", "abc").unwrap();
        store.save("old-task/copy/b.png", "def").unwrap();

        assert_eq!(
            store.load("styles/compile-styles/a.less").unwrap().as_deref(),
            Some("abc")
        );

        store.prune(&["styles"]).unwrap();
        assert!(store.load("old-task/copy/b.png").unwrap().is_none());
        assert!(store.load("styles/compile-styles/a.less").unwrap().is_some());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().to_path_buf();

        {
            let mut store = FileHashStore::new(scratch.clone());
            store.save("assets/copy/logo.png", "1234").unwrap();
        }

        let store = FileHashStore::new(scratch);
        assert_eq!(store.load("assets/copy/logo.png").unwrap().as_deref(), Some("1234"));
    }

    #[test]
    fn file_hash_changes_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.less");
        std::fs::write(&file, "a { color: red }").unwrap();
        let h1 = compute_file_hash(&file).unwrap();
        std::fs::write(&file, "a { color: blue }").unwrap();
        let h2 = compute_file_hash(&file).unwrap();
        assert_ne!(h1, h2);
    }
}
