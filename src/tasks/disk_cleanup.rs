// src/tasks/disk_cleanup.rs

//! Runs Disk Cleanup against the preconfigured cleanmgr profile.

use crate::errors::Result;
use crate::exec::{CommandSpec, ExecutionContext, Task};

pub fn task() -> Task {
    Task::new("Disk cleanup", true, |ctx| Box::pin(run_disk_cleanup(ctx)))
}

async fn run_disk_cleanup(ctx: ExecutionContext) -> Result<()> {
    ctx.log.info("DISK CLEANUP (cleanmgr)");

    let profile = ctx.settings.cleanmgr_profile;
    let spec = CommandSpec::new(vec![
        "cleanmgr".to_string(),
        format!("/sagerun:{profile}"),
    ]);

    if ctx.dry_run {
        ctx.log.info("(dry-run) would run disk cleanup");
        spec.log_invocation(&ctx.log);
        return Ok(());
    }

    let res = ctx.run_command(spec).await?;
    ctx.log
        .info(format!("disk cleanup exit code: {}", res.exit_code));
    Ok(())
}
