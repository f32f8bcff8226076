// src/exec/context.rs

//! Shared per-run execution state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::Settings;
use crate::errors::Result;
use crate::exec::process::{CommandRunner, CommandSpec, ProcessResult};
use crate::runlog::RunLog;

/// Cooperative cancellation flag for one run.
///
/// Single writer (the invoker calls [`CancelSignal::set`], repeated sets
/// are no-ops), any number of readers polling [`CancelSignal::is_set`].
/// Once set it stays set for the remainder of the run; a fresh signal is
/// created for the next run.
#[derive(Clone, Debug, Default)]
pub struct CancelSignal {
    flag: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// State shared by every task in one run: the session log, the
/// cancellation signal, the dry-run flag, the settings, and the command
/// runner behind the execution boundary.
///
/// The context is a handle: cloning is cheap and every clone refers to
/// the same run state. It is read-only for the duration of a run; the
/// task runner hands each work function a clone carrying that task's
/// termination policy.
#[derive(Clone)]
pub struct ExecutionContext {
    pub log: Arc<RunLog>,
    pub cancel: CancelSignal,
    pub dry_run: bool,

    /// Termination policy of the task currently executing, stamped from
    /// the task's descriptor by the task runner. False outside a task,
    /// so bridge commands always run to completion.
    pub allow_terminate: bool,

    pub settings: Arc<Settings>,
    pub runner: Arc<dyn CommandRunner>,
}

impl ExecutionContext {
    /// Run one external command through the configured runner, under the
    /// current termination policy.
    pub async fn run_command(&self, spec: CommandSpec) -> Result<ProcessResult> {
        self.runner
            .run(
                spec,
                Arc::clone(&self.log),
                self.cancel.clone(),
                self.allow_terminate,
            )
            .await
    }
}
