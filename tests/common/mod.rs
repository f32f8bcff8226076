#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, Once};
use std::{fs, path::Path};

use tempfile::TempDir;
use tracing_subscriber::{EnvFilter, fmt};

use maintrun::config::Settings;
use maintrun::errors::{MaintError, Result};
use maintrun::exec::{
    CancelSignal, CommandRunner, CommandSpec, ExecutionContext, ProcessResult, Task,
};
use maintrun::runlog::{Record, RunLog};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing**
///   tests (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// A command-runner double: records every spec it is asked to run (and
/// the termination policy it was handed) and completes immediately with
/// a canned result, spawning no processes.
pub struct RecordingRunner {
    pub executed: Arc<Mutex<Vec<CommandSpec>>>,
    pub policies: Arc<Mutex<Vec<bool>>>,
    pub exit_code: i32,
    pub stdout: String,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            executed: Arc::new(Mutex::new(Vec::new())),
            policies: Arc::new(Mutex::new(Vec::new())),
            exit_code: 0,
            stdout: String::new(),
        }
    }
}

impl CommandRunner for RecordingRunner {
    fn run(
        &self,
        spec: CommandSpec,
        _log: Arc<RunLog>,
        _cancel: CancelSignal,
        allow_terminate: bool,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessResult>> + Send + '_>> {
        let executed = Arc::clone(&self.executed);
        let policies = Arc::clone(&self.policies);
        let result = ProcessResult {
            exit_code: self.exit_code,
            stdout: self.stdout.clone(),
            stderr: String::new(),
        };

        Box::pin(async move {
            executed.lock().unwrap().push(spec);
            policies.lock().unwrap().push(allow_terminate);
            Ok(result)
        })
    }
}

/// An execution context wired to a [`RecordingRunner`] and a scratch log
/// directory.
pub struct TestContext {
    pub ctx: ExecutionContext,
    pub executed: Arc<Mutex<Vec<CommandSpec>>>,
    pub policies: Arc<Mutex<Vec<bool>>>,
    pub log_dir: TempDir,
}

pub fn test_context(dry_run: bool) -> TestContext {
    let log_dir = TempDir::new().expect("scratch log dir");
    let log = Arc::new(RunLog::create(log_dir.path()).expect("session log"));
    let runner = RecordingRunner::new();
    let executed = Arc::clone(&runner.executed);
    let policies = Arc::clone(&runner.policies);

    let ctx = ExecutionContext {
        log,
        cancel: CancelSignal::new(),
        dry_run,
        allow_terminate: false,
        settings: Arc::new(Settings::default()),
        runner: Arc::new(runner),
    };

    TestContext {
        ctx,
        executed,
        policies,
        log_dir,
    }
}

/// Parse every record back out of the structured sink.
pub fn read_records(log: &RunLog) -> Vec<Record> {
    read_records_from(&log.paths().jsonl)
}

pub fn read_records_from(path: &Path) -> Vec<Record> {
    let raw = fs::read_to_string(path).expect("structured log readable");
    raw.lines()
        .map(|line| serde_json::from_str(line).expect("valid record"))
        .collect()
}

/// A task that records its own name when run.
pub fn ok_task(name: &str, ran: &Arc<Mutex<Vec<String>>>) -> Task {
    let ran = Arc::clone(ran);
    let task_name = name.to_string();
    Task::new(name, false, move |_ctx| {
        let ran = Arc::clone(&ran);
        let task_name = task_name.clone();
        Box::pin(async move {
            ran.lock().unwrap().push(task_name);
            Ok(())
        })
    })
}

/// A task whose work function always fails.
pub fn failing_task(name: &str) -> Task {
    Task::new(name, false, |_ctx| {
        Box::pin(async { Err(MaintError::Other(anyhow::anyhow!("boom"))) })
    })
}

/// A task that sets the run's cancellation signal and succeeds.
pub fn cancelling_task(name: &str) -> Task {
    Task::new(name, false, |ctx| {
        Box::pin(async move {
            ctx.cancel.set();
            Ok(())
        })
    })
}
