// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod runlog;
pub mod schedule;
pub mod tasks;

use std::sync::Arc;

use tracing::debug;

use crate::cli::CliArgs;
use crate::errors::Result;
use crate::exec::{CancelSignal, ExecutionContext, Runner, SystemRunner, Task};
use crate::runlog::RunLog;
use crate::tasks::build_task_list;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings loading
/// - the session run log, with a stdout observer for live output
/// - task selection from the CLI flags
/// - Ctrl-C → cancellation signal
/// - the schedule bridge, when `--schedule`/`--unschedule` is given
pub async fn run(args: CliArgs) -> Result<()> {
    let mut settings = config::load_and_validate(args.config.as_deref())?;
    if let Some(dir) = &args.log_dir {
        settings.log_dir = dir.clone();
    }

    let log = Arc::new(RunLog::create(&settings.log_dir)?);
    log.attach_observer(|line| println!("{line}"));

    let cancel = CancelSignal::new();
    let ctx = ExecutionContext {
        log: Arc::clone(&log),
        cancel: cancel.clone(),
        dry_run: args.dry_run,
        allow_terminate: false,
        settings: Arc::new(settings),
        runner: Arc::new(SystemRunner),
    };

    if let Some(hhmm) = &args.schedule {
        return schedule::install_daily(&ctx, hhmm).await;
    }
    if args.unschedule {
        return schedule::remove(&ctx).await;
    }

    let tasks = build_task_list(&args.selection());
    if tasks.iter().any(Task::is_slow) {
        log.info("selection includes slow tasks; they may run for a long time");
    }

    // Ctrl-C → cooperative cancellation. The signal is write-once per
    // run, so only the first Ctrl-C matters.
    {
        let cancel = cancel.clone();
        let log = Arc::clone(&log);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log.warn("cancel requested; finishing the current step safely, then stopping");
                cancel.set();
            }
        });
    }

    let runner = Runner::new();
    let outcome = runner
        .run(&ctx, &tasks, |fraction, status| {
            eprintln!("[{:>3.0}%] {status}", fraction * 100.0);
        })
        .await?;

    debug!(?outcome, "maintenance run finished");
    Ok(())
}
