// src/runlog.rs

//! Per-session run log.
//!
//! One session writes two identically-timestamped files: a human-readable
//! text log and a structured JSONL log (one record per line). Both sinks
//! are written in lockstep under a single lock, and the plain message of
//! every record is also forwarded to an optional live observer so the
//! presentation layer can render output as it happens.
//!
//! This is deliberately separate from the `tracing` diagnostics in
//! [`crate::logging`]: the run log is a user-facing artifact with a
//! stable on-disk layout.
//!
//! Logging never surfaces an error: sink write failures are swallowed so
//! a full disk or a yanked log directory cannot interrupt a maintenance
//! run.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context as _;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{APP_NAME, APP_VERSION};
use crate::errors::Result;

/// Severity of a single run-log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// One append-only record, as persisted to the structured sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub ts: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Record {
    /// The corresponding line in the text sink: `<ts> <LEVEL> <message>`.
    pub fn text_line(&self) -> String {
        format!(
            "{} {} {}",
            self.ts.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level,
            self.message
        )
    }
}

/// Paths of the two per-session sink files.
#[derive(Debug, Clone)]
pub struct LogPaths {
    pub text: PathBuf,
    pub jsonl: PathBuf,
}

type Observer = Arc<dyn Fn(&str) + Send + Sync>;

struct Sinks {
    text: File,
    jsonl: File,
}

/// The session logger. Constructed once per process and shared by
/// reference (`Arc`) through the execution context; there is no global
/// instance.
pub struct RunLog {
    paths: LogPaths,
    sinks: Mutex<Sinks>,
    observer: Mutex<Option<Observer>>,
}

impl RunLog {
    /// Open a new session log in `dir`, creating the directory if needed,
    /// and write the session header.
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let paths = LogPaths {
            text: dir.join(format!("maintenance_{stamp}.log")),
            jsonl: dir.join(format!("maintenance_{stamp}.jsonl")),
        };

        let sinks = Sinks {
            text: open_append(&paths.text)?,
            jsonl: open_append(&paths.jsonl)?,
        };

        let log = Self {
            paths,
            sinks: Mutex::new(sinks),
            observer: Mutex::new(None),
        };

        log.info(format!("{APP_NAME} v{APP_VERSION} started"));
        log.info(format!("text log: {}", log.paths.text.display()));
        log.info(format!("structured log: {}", log.paths.jsonl.display()));
        Ok(log)
    }

    pub fn paths(&self) -> &LogPaths {
        &self.paths
    }

    /// Attach the live observer. The observer receives the plain message
    /// of every record, in emission order; it must be cheap and must not
    /// block (defer heavy rendering to the caller's own scheduling).
    pub fn attach_observer(&self, observer: impl Fn(&str) + Send + Sync + 'static) {
        *lock_unpoisoned(&self.observer) = Some(Arc::new(observer));
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(Level::Info, message.as_ref(), Map::new());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.emit(Level::Warn, message.as_ref(), Map::new());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(Level::Error, message.as_ref(), Map::new());
    }

    pub fn info_with(&self, message: impl AsRef<str>, data: Value) {
        self.emit(Level::Info, message.as_ref(), into_map(data));
    }

    pub fn warn_with(&self, message: impl AsRef<str>, data: Value) {
        self.emit(Level::Warn, message.as_ref(), into_map(data));
    }

    pub fn error_with(&self, message: impl AsRef<str>, data: Value) {
        self.emit(Level::Error, message.as_ref(), into_map(data));
    }

    fn emit(&self, level: Level, message: &str, data: Map<String, Value>) {
        let record = Record {
            ts: Utc::now(),
            level,
            message: message.to_string(),
            data,
        };

        // Clone the observer handle out of the lock before calling it, so
        // a re-entrant observer cannot deadlock the logger.
        let observer = lock_unpoisoned(&self.observer).clone();
        if let Some(observer) = observer {
            observer(&record.message);
        }

        // One lock around both writes keeps the sinks in lockstep across
        // concurrent callers.
        let mut sinks = lock_unpoisoned(&self.sinks);
        let _ = writeln!(sinks.text, "{}", record.text_line());
        if let Ok(line) = serde_json::to_string(&record) {
            let _ = writeln!(sinks.jsonl, "{line}");
        }
    }
}

fn open_append(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    Ok(file)
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn into_map(data: Value) -> Map<String, Value> {
    match data {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn level_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Level::Warn).unwrap(), "\"WARN\"");
        let level: Level = serde_json::from_str("\"ERROR\"").unwrap();
        assert_eq!(level, Level::Error);
    }

    #[test]
    fn text_line_carries_level_and_message() {
        let record = Record {
            ts: Utc::now(),
            level: Level::Info,
            message: "hello".to_string(),
            data: Map::new(),
        };
        let line = record.text_line();
        let mut parts = line.splitn(3, ' ');
        parts.next().unwrap();
        assert_eq!(parts.next(), Some("INFO"));
        assert_eq!(parts.next(), Some("hello"));
    }

    #[test]
    fn into_map_wraps_non_objects() {
        assert!(into_map(Value::Null).is_empty());
        let map = into_map(json!({"k": 1}));
        assert_eq!(map.get("k"), Some(&json!(1)));
        let wrapped = into_map(json!(3));
        assert_eq!(wrapped.get("value"), Some(&json!(3)));
    }
}
