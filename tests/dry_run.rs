mod common;

use common::{init_tracing, read_records, test_context};
use maintrun::exec::{RunOutcome, run_tasks};
use maintrun::schedule;
use maintrun::tasks::{Selection, build_task_list};

#[tokio::test]
async fn dry_run_executes_no_commands() {
    init_tracing();
    let tc = test_context(true);
    let tasks = build_task_list(&Selection::all());

    let outcome = run_tasks(&tc.ctx, &tasks, |_, _| {}).await;

    assert_eq!(outcome, RunOutcome::Completed);
    assert!(tc.executed.lock().unwrap().is_empty());

    let records = read_records(&tc.ctx.log);
    // Every subprocess task still describes its intended command: recycle
    // bin, cleanmgr, storage sense, sfc, dism, and the update probe.
    let echoed = records.iter().filter(|r| r.message.starts_with("$ ")).count();
    assert_eq!(echoed, 6);
    assert!(records.iter().any(|r| r.message == "dry-run: true"));
    assert!(records.iter().any(|r| r.message == "=== MAINTENANCE COMPLETE ==="));
}

#[tokio::test]
async fn schedule_dry_run_logs_the_command_without_executing() {
    init_tracing();
    let tc = test_context(true);

    schedule::install_daily(&tc.ctx, "03:00").await.unwrap();
    schedule::remove(&tc.ctx).await.unwrap();

    assert!(tc.executed.lock().unwrap().is_empty());

    let records = read_records(&tc.ctx.log);
    let echoed = records
        .iter()
        .filter(|r| r.message.starts_with("$ schtasks"))
        .count();
    assert_eq!(echoed, 2);
}
