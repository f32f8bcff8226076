// src/tasks/windows_update.rs

//! Checks for and installs updates through the PSWindowsUpdate module.
//!
//! Two subprocess phases: a quick module-availability probe, then the
//! install itself. Neither is interrupted once started; a cancel takes
//! effect when the running command finishes.

use crate::errors::Result;
use crate::exec::{ExecutionContext, Task};
use crate::tasks::powershell_command;

pub fn task() -> Task {
    Task::new("Windows Update", false, |ctx| {
        Box::pin(run_windows_update(ctx))
    })
    .slow()
}

async fn run_windows_update(ctx: ExecutionContext) -> Result<()> {
    ctx.log.info("WINDOWS UPDATE (PSWindowsUpdate)");
    ctx.log
        .info("note: cancel takes effect after the update command completes");

    let check = powershell_command(
        &ctx,
        "Get-Module -ListAvailable PSWindowsUpdate | Select-Object -First 1",
    );

    if ctx.dry_run {
        ctx.log
            .info("(dry-run) would check PSWindowsUpdate and install updates");
        check.log_invocation(&ctx.log);
        return Ok(());
    }

    let probe = ctx.run_command(check).await?;
    if !probe.success() || probe.stdout.trim().is_empty() {
        ctx.log
            .error("PSWindowsUpdate module not found in 64-bit PowerShell");
        ctx.log
            .error("fix: install it from an elevated 64-bit PowerShell:");
        ctx.log
            .info("Install-PackageProvider -Name NuGet -MinimumVersion 2.8.5.201 -Force");
        ctx.log.info("Install-Module PSWindowsUpdate -Force");
        return Ok(());
    }

    let install = powershell_command(
        &ctx,
        "Import-Module PSWindowsUpdate -Force; Install-WindowsUpdate -AcceptAll -IgnoreReboot",
    );
    let res = ctx.run_command(install).await?;
    ctx.log
        .info(format!("Windows Update exit code: {}", res.exit_code));
    Ok(())
}
