// src/exec/runner.rs

//! Sequential task runner.
//!
//! Runs an ordered task list against one shared context: checks the
//! cancellation signal between tasks, isolates per-task failures (one
//! flaky system utility must not keep unrelated tasks from running), and
//! reports fractional progress keyed to task count. Durations are too
//! heterogeneous (seconds vs. tens of minutes) for time-based progress.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::json;
use tracing::debug;

use crate::errors::{MaintError, Result};
use crate::exec::context::ExecutionContext;

pub type TaskFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;
pub type TaskFn = Box<dyn Fn(ExecutionContext) -> TaskFuture + Send + Sync>;

/// A named unit of work plus its cancellation policy.
///
/// `allow_terminate` declares whether the task tolerates having its
/// subprocess hard-killed on cancel; the runner stamps it onto the
/// context each work function receives, so the declared policy is the
/// enforced one. `slow` is an informational hint for the presentation
/// layer and does not affect execution.
pub struct Task {
    name: String,
    work: TaskFn,
    allow_terminate: bool,
    slow: bool,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        allow_terminate: bool,
        work: impl Fn(ExecutionContext) -> TaskFuture + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            work: Box::new(work),
            allow_terminate,
            slow: false,
        }
    }

    /// Mark this task as long-running.
    pub fn slow(mut self) -> Self {
        self.slow = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allow_terminate(&self) -> bool {
        self.allow_terminate
    }

    pub fn is_slow(&self) -> bool {
        self.slow
    }

    /// Run the work function against a context clone carrying this
    /// task's termination policy, so every command the body issues
    /// inherits the declared policy.
    pub async fn run(&self, ctx: &ExecutionContext) -> Result<()> {
        let ctx = ExecutionContext {
            allow_terminate: self.allow_terminate,
            ..ctx.clone()
        };
        (self.work)(ctx).await
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("allow_terminate", &self.allow_terminate)
            .field("slow", &self.slow)
            .finish_non_exhaustive()
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

/// Run `tasks` in order against `ctx`.
///
/// `on_progress` receives a fraction in `0.0..=1.0` plus a status line:
/// once before each task with `(i-1)/N`, and exactly once with `1.0` at
/// the end of the run, whether it completed, failed along the way, or
/// was cancelled. An empty list logs a warning and reports nothing.
///
/// The callback runs on the worker's flow; it must be cheap and
/// non-blocking, and any UI marshaling is its own business.
pub async fn run_tasks<F>(ctx: &ExecutionContext, tasks: &[Task], mut on_progress: F) -> RunOutcome
where
    F: FnMut(f64, &str),
{
    let total = tasks.len();
    if total == 0 {
        ctx.log.warn("no tasks selected");
        return RunOutcome::Completed;
    }

    ctx.log.info("=== MAINTENANCE START ===");
    ctx.log.info(format!("dry-run: {}", ctx.dry_run));

    for (i, task) in tasks.iter().enumerate() {
        let position = i + 1;

        if ctx.cancel.is_set() {
            ctx.log.warn("cancel requested; stopping before the next task");
            break;
        }

        on_progress(
            i as f64 / total as f64,
            &format!("Running: {} ({position}/{total})", task.name()),
        );
        ctx.log
            .info(format!("--- {} ({position}/{total}) ---", task.name()));

        if let Err(err) = task.run(ctx).await {
            ctx.log.error_with(
                format!("task failed: {}", task.name()),
                json!({ "task": task.name(), "error": err.to_string() }),
            );
        }
    }

    on_progress(1.0, "Ready");

    if ctx.cancel.is_set() {
        ctx.log.warn("=== MAINTENANCE CANCELLED ===");
        RunOutcome::Cancelled
    } else {
        ctx.log.info("=== MAINTENANCE COMPLETE ===");
        RunOutcome::Completed
    }
}

/// Guard enforcing at most one active run.
///
/// A second [`Runner::run`] while one is in flight is rejected with
/// [`MaintError::RunActive`]; nothing is queued.
#[derive(Debug, Default)]
pub struct Runner {
    active: AtomicBool,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub async fn run<F>(
        &self,
        ctx: &ExecutionContext,
        tasks: &[Task],
        on_progress: F,
    ) -> Result<RunOutcome>
    where
        F: FnMut(f64, &str),
    {
        if self.active.swap(true, Ordering::SeqCst) {
            debug!("run request rejected; a run is already active");
            return Err(MaintError::RunActive);
        }

        let outcome = run_tasks(ctx, tasks, on_progress).await;
        self.active.store(false, Ordering::SeqCst);
        Ok(outcome)
    }
}
