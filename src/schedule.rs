// src/schedule.rs

//! Daily-schedule bridge.
//!
//! Registers or removes a recurring invocation of this program through
//! the OS task scheduler (`schtasks`). Both operations issue exactly one
//! external command with `allow_terminate = false`; registration is fast
//! and must run to completion. The time of day is validated before any
//! command is built, so malformed input never reaches the scheduler.

use std::env;
use std::sync::OnceLock;

use anyhow::Context as _;
use regex::Regex;

use crate::errors::{MaintError, Result};
use crate::exec::{CommandSpec, ExecutionContext};

// Accepts an optional leading zero on the hour ("3:00" and "03:00").
fn hhmm_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([01]?\d|2[0-3]):[0-5]\d$").expect("hardcoded regex"))
}

pub fn validate_time_of_day(hhmm: &str) -> Result<()> {
    if hhmm_re().is_match(hhmm) {
        Ok(())
    } else {
        Err(MaintError::InvalidTimeOfDay(hhmm.to_string()))
    }
}

/// Register a daily run of this program at `hhmm`.
pub async fn install_daily(ctx: &ExecutionContext, hhmm: &str) -> Result<()> {
    validate_time_of_day(hhmm)?;

    let task_name = ctx.settings.schedule_task_name.clone();
    let target = reinvocation_target()?;
    let spec = CommandSpec::new([
        "schtasks",
        "/Create",
        "/F",
        "/TN",
        task_name.as_str(),
        "/SC",
        "DAILY",
        "/ST",
        hhmm,
        "/RL",
        "HIGHEST",
        "/TR",
        target.as_str(),
    ]);

    if ctx.dry_run {
        ctx.log.info(format!(
            "(dry-run) would create scheduled task '{task_name}' daily at {hhmm}"
        ));
        spec.log_invocation(&ctx.log);
        return Ok(());
    }

    ctx.log
        .info(format!("creating scheduled task '{task_name}' daily at {hhmm}"));
    // Registration commands are fast and must run to completion.
    let ctx = ExecutionContext {
        allow_terminate: false,
        ..ctx.clone()
    };
    let res = ctx.run_command(spec).await?;
    ctx.log
        .info(format!("task scheduler exit code: {}", res.exit_code));
    Ok(())
}

/// Remove the daily scheduled run.
pub async fn remove(ctx: &ExecutionContext) -> Result<()> {
    let task_name = ctx.settings.schedule_task_name.clone();
    let spec = CommandSpec::new(["schtasks", "/Delete", "/F", "/TN", task_name.as_str()]);

    if ctx.dry_run {
        ctx.log
            .info(format!("(dry-run) would remove scheduled task '{task_name}'"));
        spec.log_invocation(&ctx.log);
        return Ok(());
    }

    ctx.log
        .info(format!("removing scheduled task '{task_name}'"));
    let ctx = ExecutionContext {
        allow_terminate: false,
        ..ctx.clone()
    };
    let res = ctx.run_command(spec).await?;
    ctx.log
        .info(format!("task scheduler exit code: {}", res.exit_code));
    Ok(())
}

/// The command line the scheduled task re-invokes: this executable with
/// the arguments it was started with, minus the scheduling flags
/// themselves (a scheduled run should run the selected tasks, not
/// re-register itself).
fn reinvocation_target() -> Result<String> {
    let exe = env::current_exe().context("resolving current executable")?;
    let mut parts = vec![format!("\"{}\"", exe.display())];
    parts.extend(
        passthrough_args(env::args().skip(1)).into_iter().map(|arg| format!("\"{arg}\"")),
    );
    Ok(parts.join(" "))
}

fn passthrough_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--schedule" {
            iter.next();
            continue;
        }
        if arg.starts_with("--schedule=") || arg == "--unschedule" {
            continue;
        }
        out.push(arg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn accepts_well_formed_times() {
        for hhmm in ["00:00", "03:00", "7:05", "19:30", "23:59"] {
            assert!(validate_time_of_day(hhmm).is_ok(), "{hhmm}");
        }
    }

    #[test]
    fn rejects_malformed_times() {
        for hhmm in ["24:00", "7:5", "aa:bb", "0300", "", " 03:00", "03:60"] {
            assert!(
                matches!(validate_time_of_day(hhmm), Err(MaintError::InvalidTimeOfDay(_))),
                "{hhmm:?}"
            );
        }
    }

    #[test]
    fn passthrough_drops_scheduling_flags() {
        assert_eq!(
            passthrough_args(owned(&["--temp", "--schedule", "03:00", "--dry-run"])),
            owned(&["--temp", "--dry-run"])
        );
        assert_eq!(
            passthrough_args(owned(&["--schedule=03:00", "--all"])),
            owned(&["--all"])
        );
        assert!(passthrough_args(owned(&["--unschedule"])).is_empty());
    }
}
