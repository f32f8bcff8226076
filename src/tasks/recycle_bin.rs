// src/tasks/recycle_bin.rs

//! Empties the recycle bin for the current user via PowerShell.

use serde_json::json;

use crate::errors::Result;
use crate::exec::{ExecutionContext, Task};
use crate::tasks::powershell_command;

pub fn task() -> Task {
    Task::new("Recycle bin", false, |ctx| Box::pin(empty_recycle_bin(ctx)))
}

async fn empty_recycle_bin(ctx: ExecutionContext) -> Result<()> {
    ctx.log.info("RECYCLE BIN");

    let spec = powershell_command(&ctx, "Clear-RecycleBin -Force -ErrorAction SilentlyContinue");

    if ctx.dry_run {
        ctx.log.info("(dry-run) would empty the recycle bin");
        spec.log_invocation(&ctx.log);
        return Ok(());
    }

    let res = ctx.run_command(spec).await?;
    if res.success() {
        ctx.log.info("recycle bin emptied");
    } else {
        ctx.log.warn_with(
            format!("recycle bin command returned code {}", res.exit_code),
            json!({ "exit_code": res.exit_code }),
        );
    }
    Ok(())
}
