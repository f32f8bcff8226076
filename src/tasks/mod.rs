// src/tasks/mod.rs

//! The maintenance task catalogue.
//!
//! Each submodule exposes one `task()` constructor. The bodies describe
//! their intended action and stop there in dry-run mode, and every
//! subprocess goes through the [`CommandSpec`] boundary so the
//! cancellation policy applies uniformly.

mod disk_cleanup;
mod dism;
mod recycle_bin;
mod sfc;
mod storage_sense;
mod temp_cleanup;
mod windows_update;

use crate::exec::{CommandSpec, ExecutionContext, Task};

/// Which maintenance tasks a run includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub temp_cleanup: bool,
    pub recycle_bin: bool,
    pub disk_cleanup: bool,
    pub storage_sense: bool,
    pub sfc: bool,
    pub dism: bool,
    pub windows_update: bool,
}

impl Selection {
    pub fn all() -> Self {
        Self {
            temp_cleanup: true,
            recycle_bin: true,
            disk_cleanup: true,
            storage_sense: true,
            sfc: true,
            dism: true,
            windows_update: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Build the ordered task list for a run. The order is fixed: cheap
/// cleanups first, the slow repair and update tasks last.
pub fn build_task_list(selection: &Selection) -> Vec<Task> {
    let mut tasks = Vec::new();
    if selection.temp_cleanup {
        tasks.push(temp_cleanup::task());
    }
    if selection.recycle_bin {
        tasks.push(recycle_bin::task());
    }
    if selection.disk_cleanup {
        tasks.push(disk_cleanup::task());
    }
    if selection.storage_sense {
        tasks.push(storage_sense::task());
    }
    if selection.sfc {
        tasks.push(sfc::task());
    }
    if selection.dism {
        tasks.push(dism::task());
    }
    if selection.windows_update {
        tasks.push(windows_update::task());
    }
    tasks
}

/// PowerShell invocation shared by the tasks that go through it.
pub(crate) fn powershell_command(ctx: &ExecutionContext, script: &str) -> CommandSpec {
    let exe = ctx.settings.powershell_exe.display().to_string();
    CommandSpec::new([
        exe.as_str(),
        "-NoProfile",
        "-ExecutionPolicy",
        "Bypass",
        "-Command",
        script,
    ])
}
