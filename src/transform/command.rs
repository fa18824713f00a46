// src/transform/command.rs

//! External-command transform adapter.
//!
//! Each `[transform.<name>]` section becomes one `CommandTransform`. The
//! command template is substituted per file (`{input}`, `{output}` plus the
//! shared context placeholders) and run through the platform shell. A
//! non-zero exit becomes a `Transform` error carrying the offending path and
//! the tail of stderr.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::TransformConfig;
use crate::context::BuildContext;
use crate::errors::{Result, SitegraphError};
use crate::transform::{OutputFile, Transform, TransformJob};

/// How many trailing stderr lines are kept in an error message.
const STDERR_TAIL_LINES: usize = 8;

pub struct CommandTransform {
    name: String,
    cmd_template: String,
    input_ext: Vec<String>,
    output_ext: Option<String>,
    order_sensitive: bool,
}

impl CommandTransform {
    pub fn from_config(name: &str, cfg: &TransformConfig) -> Self {
        Self {
            name: name.to_string(),
            cmd_template: cfg.cmd.clone(),
            input_ext: cfg.input_ext.clone(),
            output_ext: cfg.output_ext.clone(),
            order_sensitive: cfg.order_sensitive,
        }
    }
}

impl Transform for CommandTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn accepts_ext(&self) -> &[String] {
        &self.input_ext
    }

    fn output_ext(&self) -> Option<&str> {
        self.output_ext.as_deref()
    }

    fn order_sensitive(&self) -> bool {
        self.order_sensitive
    }

    fn apply<'a>(
        &'a self,
        job: TransformJob,
        ctx: &'a BuildContext,
    ) -> Pin<Box<dyn Future<Output = Result<OutputFile>> + Send + 'a>> {
        Box::pin(async move {
            let cmd_line = ctx
                .substitute(&self.cmd_template)
                .replace("{input}", &job.input.to_string_lossy())
                .replace("{output}", &job.output.to_string_lossy());

            if let Some(parent) = job.output.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            debug!(transform = %self.name, file = %job.rel, cmd = %cmd_line, "running transform command");

            let output = shell_command(&cmd_line)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .await
                .map_err(|e| SitegraphError::Transform {
                    transform: self.name.clone(),
                    path: job.input.clone(),
                    message: format!("failed to spawn command: {e}"),
                })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(SitegraphError::Transform {
                    transform: self.name.clone(),
                    path: job.input.clone(),
                    message: format!(
                        "exit code {}: {}",
                        output.status.code().unwrap_or(-1),
                        stderr_tail(&stderr)
                    ),
                });
            }

            info!(transform = %self.name, file = %job.rel, "transform finished");

            Ok(OutputFile {
                path: job.output,
                rel: job.rel,
            })
        })
    }
}

/// Build a shell command appropriate for the platform.
pub(crate) fn shell_command(cmd_line: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_tail_keeps_last_lines_only() {
        let long: String = (0..20).map(|i| format!("line{i}\n")).collect();
        let tail = stderr_tail(&long);
        assert!(tail.starts_with("line12"));
        assert!(tail.ends_with("line19"));
    }
}
