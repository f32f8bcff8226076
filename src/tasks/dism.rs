// src/tasks/dism.rs

//! Component store repair. Like SFC, DISM runs to completion even when a
//! cancel is pending; interrupting it can leave the store inconsistent.

use crate::errors::Result;
use crate::exec::{CommandSpec, ExecutionContext, Task};

pub fn task() -> Task {
    Task::new("DISM repair", false, |ctx| Box::pin(run_dism(ctx))).slow()
}

async fn run_dism(ctx: ExecutionContext) -> Result<()> {
    ctx.log.info("DISM RestoreHealth");
    ctx.log.info("note: cancel takes effect after DISM completes");

    let spec = CommandSpec::new(["dism", "/Online", "/Cleanup-Image", "/RestoreHealth"]);

    if ctx.dry_run {
        ctx.log.info("(dry-run) would run DISM");
        spec.log_invocation(&ctx.log);
        return Ok(());
    }

    let res = ctx.run_command(spec).await?;
    ctx.log.info(format!("DISM exit code: {}", res.exit_code));
    Ok(())
}
