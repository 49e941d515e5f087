// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_manifest_path;

/// Command-line arguments for `assetflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetflow",
    version,
    about = "Build an asset graph from a manifest and carve one bundle per entry.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the build manifest (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_manifest_path())]
    pub manifest: PathBuf,

    /// Maximum number of build tasks running at once.
    ///
    /// Overrides `[config].max_concurrent` from the manifest.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub max_concurrent: Option<i64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the asset graph, but don't bundle anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
