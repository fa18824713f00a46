// src/transform/mod.rs

//! Transform adapters: named external capabilities behind a uniform
//! "consume file, produce file" contract.
//!
//! - [`command`] wraps an arbitrary external tool (compiler, bundler,
//!   optimizer) declared in `[transform.<name>]`.
//! - [`copy`] is the single built-in transform (verbatim asset copy).
//! - [`registry`] maps transform names to implementations at startup, so an
//!   unknown reference is a configuration error, never a silent no-op.
//! - [`cache`] provides content-addressed skipping of unchanged inputs.
//!
//! The core never inspects file content; a transform's only observable
//! effect is the output file it writes inside the designated stage root.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::context::BuildContext;
use crate::errors::Result;
use crate::paths::RelPath;

pub mod cache;
pub mod command;
pub mod copy;
pub mod registry;

pub use cache::{FileHashStore, HashStore, MemoryHashStore, compute_file_hash};
pub use command::CommandTransform;
pub use copy::CopyTransform;
pub use registry::{BUILTIN_TRANSFORMS, TransformRegistry};

/// One file handed to a transform stage.
#[derive(Debug, Clone)]
pub struct TransformJob {
    /// Absolute (or cwd-relative) input path.
    pub input: PathBuf,
    /// Path relative to the stage's input root.
    pub rel: RelPath,
    /// Where the transform must write its result.
    pub output: PathBuf,
}

/// A file produced by a transform stage; feeds the next stage or is final.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub rel: RelPath,
}

/// A named external file conversion capability.
///
/// Implementations are stateless across invocations; per-invocation state
/// (spawned process, open files) lives inside `apply`. The boxed-future
/// signature keeps the trait object-safe without an async-trait dependency.
pub trait Transform: Send + Sync {
    fn name(&self) -> &str;

    /// Input extensions (without dot) this adapter accepts. Empty = any.
    fn accepts_ext(&self) -> &[String];

    /// Extension of produced files; `None` keeps the input extension.
    fn output_ext(&self) -> Option<&str>;

    /// Order-sensitive adapters (bundlers) need the full, deterministic
    /// input set; `skip`-policy file drops are escalated to aborts for them.
    fn order_sensitive(&self) -> bool {
        false
    }

    /// Convert one file. Errors carry the offending path so the task layer
    /// can apply its error policy.
    fn apply<'a>(
        &'a self,
        job: TransformJob,
        ctx: &'a BuildContext,
    ) -> Pin<Box<dyn Future<Output = Result<OutputFile>> + Send + 'a>>;
}

impl fmt::Debug for dyn Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform").field("name", &self.name()).finish()
    }
}

/// Whether `rel` has an extension the transform accepts.
pub fn accepts(transform: &dyn Transform, rel: &RelPath) -> bool {
    let accepted = transform.accepts_ext();
    if accepted.is_empty() {
        return true;
    }
    match rel.extension() {
        Some(ext) => accepted.iter().any(|a| a == ext),
        None => false,
    }
}
