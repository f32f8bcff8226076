// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::tasks::Selection;

/// Command-line arguments for `maintrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "maintrun",
    version,
    about = "Run Windows maintenance tasks sequentially with live logging, cancellation, and daily scheduling.",
    long_about = None
)]
pub struct CliArgs {
    /// Clear the top level of the temp directory (skips locked files).
    #[arg(long)]
    pub temp: bool,

    /// Empty the recycle bin for the current user.
    #[arg(long)]
    pub recycle_bin: bool,

    /// Run Disk Cleanup (`cleanmgr /sagerun`).
    #[arg(long)]
    pub disk_cleanup: bool,

    /// Trigger a Storage Sense pass.
    #[arg(long)]
    pub storage_sense: bool,

    /// Run `sfc /scannow` (slow).
    #[arg(long)]
    pub sfc: bool,

    /// Run DISM RestoreHealth (slow).
    #[arg(long)]
    pub dism: bool,

    /// Check and install updates via PSWindowsUpdate (slow).
    #[arg(long)]
    pub windows_update: bool,

    /// Select every maintenance task.
    #[arg(long)]
    pub all: bool,

    /// Describe intended actions without performing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Install a daily scheduled run at this time (HH:MM, e.g. 03:00).
    #[arg(long, value_name = "HH:MM", conflicts_with = "unschedule")]
    pub schedule: Option<String>,

    /// Remove the daily scheduled run.
    #[arg(long)]
    pub unschedule: bool,

    /// Path to an optional TOML settings file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the log directory from settings.
    #[arg(long, value_name = "PATH")]
    pub log_dir: Option<PathBuf>,

    /// Diagnostics level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MAINTRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// The task selection these flags describe; `--all` wins over the
    /// individual flags.
    pub fn selection(&self) -> Selection {
        if self.all {
            return Selection::all();
        }
        Selection {
            temp_cleanup: self.temp,
            recycle_bin: self.recycle_bin,
            disk_cleanup: self.disk_cleanup,
            storage_sense: self.storage_sense,
            sfc: self.sfc,
            dism: self.dism,
            windows_update: self.windows_update,
        }
    }
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

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
