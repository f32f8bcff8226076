// src/tasks/temp_cleanup.rs

//! Clears the top level of the OS temp directory.
//!
//! Locked files are counted as skipped rather than failing the task, and
//! symlinked directories are skipped rather than followed. The per-entry
//! loop checks the cancel signal so a large temp directory stays
//! responsive to cancellation.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context as _;
use serde_json::json;

use crate::errors::Result;
use crate::exec::{ExecutionContext, Task};

pub fn task() -> Task {
    Task::new("Temp cleanup", false, |ctx| Box::pin(clear_temp(ctx)))
}

async fn clear_temp(ctx: ExecutionContext) -> Result<()> {
    let temp_dir = env::temp_dir();
    clear_dir(&ctx, &temp_dir)
}

fn clear_dir(ctx: &ExecutionContext, dir: &Path) -> Result<()> {
    ctx.log.info("TEMP CLEANUP");
    ctx.log.info(format!("target: {}", dir.display()));

    let mut deleted = 0u32;
    let mut skipped = 0u32;
    let mut errors = 0u32;

    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        if ctx.cancel.is_set() {
            ctx.log.warn("cancel requested; stopping temp cleanup");
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                errors += 1;
                ctx.log
                    .error_with("error reading temp entry", json!({ "error": err.to_string() }));
                continue;
            }
        };
        let path = entry.path();

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                errors += 1;
                ctx.log.error_with(
                    format!("error inspecting {}", path.display()),
                    json!({ "error": err.to_string() }),
                );
                continue;
            }
        };

        if file_type.is_symlink() {
            // Only a symlinked directory needs the skip; remove_dir_all
            // would cross into its target. A symlinked file is left
            // untouched.
            if path.is_dir() {
                skipped += 1;
                ctx.log
                    .warn(format!("skipped symlink dir: {}", path.display()));
            }
            continue;
        }

        let outcome = if ctx.dry_run {
            Ok(())
        } else if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };

        match outcome {
            Ok(()) => deleted += 1,
            Err(err) if err.kind() == ErrorKind::PermissionDenied => {
                skipped += 1;
                ctx.log.warn(format!("skipped (in use): {}", path.display()));
            }
            Err(err) => {
                errors += 1;
                ctx.log.error_with(
                    format!("failed to delete {}", path.display()),
                    json!({ "error": err.to_string() }),
                );
            }
        }
    }

    ctx.log.info_with(
        format!("summary: deleted {deleted}, skipped {skipped}, errors {errors}"),
        json!({ "deleted": deleted, "skipped": skipped, "errors": errors }),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::config::Settings;
    use crate::exec::{CancelSignal, SystemRunner};
    use crate::runlog::RunLog;

    fn test_ctx(dry_run: bool) -> (ExecutionContext, TempDir) {
        let log_dir = TempDir::new().unwrap();
        let ctx = ExecutionContext {
            log: Arc::new(RunLog::create(log_dir.path()).unwrap()),
            cancel: CancelSignal::new(),
            dry_run,
            allow_terminate: false,
            settings: Arc::new(Settings::default()),
            runner: Arc::new(SystemRunner),
        };
        (ctx, log_dir)
    }

    fn populate(dir: &Path) {
        fs::write(dir.join("a.tmp"), b"x").unwrap();
        fs::write(dir.join("b.tmp"), b"y").unwrap();
        fs::create_dir(dir.join("sub")).unwrap();
        fs::write(dir.join("sub").join("c.tmp"), b"z").unwrap();
    }

    #[test]
    fn deletes_files_and_directories() {
        let (ctx, _log_dir) = test_ctx(false);
        let target = TempDir::new().unwrap();
        populate(target.path());

        clear_dir(&ctx, target.path()).unwrap();
        assert_eq!(fs::read_dir(target.path()).unwrap().count(), 0);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let (ctx, _log_dir) = test_ctx(true);
        let target = TempDir::new().unwrap();
        populate(target.path());

        clear_dir(&ctx, target.path()).unwrap();
        assert_eq!(fs::read_dir(target.path()).unwrap().count(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_skipped_not_followed() {
        use std::os::unix::fs::symlink;

        let (ctx, _log_dir) = test_ctx(false);
        let target = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("keep.txt"), b"k").unwrap();

        symlink(outside.path(), target.path().join("linkdir")).unwrap();
        symlink(
            outside.path().join("keep.txt"),
            target.path().join("linkfile"),
        )
        .unwrap();
        fs::write(target.path().join("plain.tmp"), b"x").unwrap();

        clear_dir(&ctx, target.path()).unwrap();

        // Links and the linked-to content survive; the plain file is gone.
        assert!(target.path().join("linkdir").exists());
        assert!(target.path().join("linkfile").exists());
        assert!(outside.path().join("keep.txt").exists());
        assert!(!target.path().join("plain.tmp").exists());
    }

    #[test]
    fn cancel_stops_the_walk() {
        let (ctx, _log_dir) = test_ctx(false);
        let target = TempDir::new().unwrap();
        populate(target.path());

        ctx.cancel.set();
        clear_dir(&ctx, target.path()).unwrap();
        // Nothing was deleted; the signal was already set at the first entry.
        assert_eq!(fs::read_dir(target.path()).unwrap().count(), 3);
    }
}
