// src/config.rs

//! Application settings.
//!
//! Everything has a sensible default, so `maintrun` runs without any
//! settings file; `--config` points at an optional TOML document that
//! overrides individual fields:
//!
//! ```toml
//! log_dir = "C:\\maintenance\\logs"
//! cleanmgr_profile = 42
//! schedule_task_name = "NightlyMaintenance"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

use crate::errors::{MaintError, Result};

pub const APP_NAME: &str = "maintrun";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings for one maintrun session.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory receiving the per-session log files.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Explicit 64-bit Windows PowerShell 5.1. The full path avoids the
    /// x86 module mismatch when loading PSWindowsUpdate.
    #[serde(default = "default_powershell_exe")]
    pub powershell_exe: PathBuf,

    /// cleanmgr profile id; run `cleanmgr /sageset:<id>` once manually to
    /// configure which categories it cleans.
    #[serde(default = "default_cleanmgr_profile")]
    pub cleanmgr_profile: u32,

    /// Name under which `--schedule` registers the daily task.
    #[serde(default = "default_schedule_task_name")]
    pub schedule_task_name: String,
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_NAME).join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn default_powershell_exe() -> PathBuf {
    PathBuf::from(r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe")
}

fn default_cleanmgr_profile() -> u32 {
    100
}

fn default_schedule_task_name() -> String {
    "MaintenanceTool".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            powershell_exe: default_powershell_exe(),
            cleanmgr_profile: default_cleanmgr_profile(),
            schedule_task_name: default_schedule_task_name(),
        }
    }
}

/// Read a settings file from `path`. This only performs TOML
/// deserialization; use [`load_and_validate`] for the full entry point.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading settings file at {}", path.display()))?;

    let settings: Settings = toml::from_str(&contents)?;
    Ok(settings)
}

/// Load settings (defaults when no file is given) and run basic
/// validation.
pub fn load_and_validate(path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(p) => load_from_path(p)?,
        None => Settings::default(),
    };
    validate_settings(&settings)?;
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.schedule_task_name.trim().is_empty() {
        return Err(MaintError::Config(
            "schedule_task_name must not be empty".to_string(),
        ));
    }
    Ok(())
}
