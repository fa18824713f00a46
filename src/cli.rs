// src/cli.rs

//! CLI argument parsing using `clap` (derive).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::EnvMode;

/// Command-line arguments for `sitegraph`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitegraph",
    version,
    about = "Route source files through named external transforms along a task dependency graph.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run (e.g. `build`, `docs`, `clean`).
    #[arg(value_name = "TASK", default_value = "build")]
    pub task: String,

    /// Path to the config file (TOML).
    ///
    /// Default: `Sitegraph.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Sitegraph.toml")]
    pub config: String,

    /// Build environment mode (overrides `[site].env`).
    #[arg(long, value_enum, value_name = "MODE")]
    pub env: Option<EnvMode>,

    /// Source root override (overrides `[paths].src`).
    #[arg(long, value_name = "DIR")]
    pub src: Option<PathBuf>,

    /// Destination root override (overrides `[paths].dest`).
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Base URL handed to sitemap-generating transforms
    /// (overrides `[site].base_url`).
    #[arg(long, value_name = "URL")]
    pub site_url: Option<String>,

    /// Keep running after the initial build, re-invoking tasks whose watch
    /// patterns match filesystem changes.
    #[arg(long)]
    pub watch: bool,

    /// Parse + validate, print the resolved plan, but don't execute.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEGRAPH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl ValueEnum for EnvMode {
    fn value_variants<'a>() -> &'a [Self] {
        &[EnvMode::Development, EnvMode::Production]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
