// src/transform/copy.rs

//! Built-in `copy` transform: verbatim asset passthrough into the
//! destination tree.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::context::BuildContext;
use crate::errors::{Result, SitegraphError};
use crate::transform::{OutputFile, Transform, TransformJob};

pub struct CopyTransform;

impl Transform for CopyTransform {
    fn name(&self) -> &str {
        "copy"
    }

    fn accepts_ext(&self) -> &[String] {
        &[]
    }

    fn output_ext(&self) -> Option<&str> {
        None
    }

    fn apply<'a>(
        &'a self,
        job: TransformJob,
        _ctx: &'a BuildContext,
    ) -> Pin<Box<dyn Future<Output = Result<OutputFile>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(parent) = job.output.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            tokio::fs::copy(&job.input, &job.output)
                .await
                .map_err(|e| SitegraphError::Transform {
                    transform: "copy".to_string(),
                    path: job.input.clone(),
                    message: format!("copy failed: {e}"),
                })?;

            debug!(file = %job.rel, "copied asset");

            Ok(OutputFile {
                path: job.output,
                rel: job.rel,
            })
        })
    }
}
