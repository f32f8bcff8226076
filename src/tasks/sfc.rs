// src/tasks/sfc.rs

//! System file check. SFC must never be interrupted mid-scan, so the
//! command runs to completion even when a cancel is pending.

use crate::errors::Result;
use crate::exec::{CommandSpec, ExecutionContext, Task};

pub fn task() -> Task {
    Task::new("SFC scan", false, |ctx| Box::pin(run_sfc(ctx))).slow()
}

async fn run_sfc(ctx: ExecutionContext) -> Result<()> {
    ctx.log.info("SFC /scannow");
    ctx.log.info("note: cancel takes effect after SFC completes");

    let spec = CommandSpec::new(["sfc", "/scannow"]);

    if ctx.dry_run {
        ctx.log.info("(dry-run) would run SFC");
        spec.log_invocation(&ctx.log);
        return Ok(());
    }

    let res = ctx.run_command(spec).await?;
    ctx.log.info(format!("SFC exit code: {}", res.exit_code));
    Ok(())
}
