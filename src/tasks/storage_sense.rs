// src/tasks/storage_sense.rs

//! Triggers a Storage Sense pass. Not every system has it enabled, so a
//! failing exit code is only a warning.

use crate::errors::Result;
use crate::exec::{ExecutionContext, Task};
use crate::tasks::powershell_command;

pub fn task() -> Task {
    Task::new("Storage Sense", true, |ctx| Box::pin(run_storage_sense(ctx)))
}

async fn run_storage_sense(ctx: ExecutionContext) -> Result<()> {
    ctx.log.info("STORAGE SENSE");

    let spec = powershell_command(&ctx, "Start-StorageSense");

    if ctx.dry_run {
        ctx.log.info("(dry-run) would trigger Storage Sense");
        spec.log_invocation(&ctx.log);
        return Ok(());
    }

    let res = ctx.run_command(spec).await?;
    if res.success() {
        ctx.log.info("Storage Sense triggered");
    } else {
        ctx.log
            .warn("Storage Sense not available on this system (safe to ignore)");
    }
    Ok(())
}
