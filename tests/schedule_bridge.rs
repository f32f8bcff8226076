mod common;

use common::{init_tracing, read_records, test_context};
use maintrun::errors::MaintError;
use maintrun::schedule;

#[tokio::test]
async fn malformed_time_issues_no_command() {
    init_tracing();
    let tc = test_context(false);

    let err = schedule::install_daily(&tc.ctx, "25:99").await.unwrap_err();
    assert!(matches!(err, MaintError::InvalidTimeOfDay(_)));
    assert!(tc.executed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn install_builds_the_expected_schtasks_command() {
    init_tracing();
    let tc = test_context(false);

    schedule::install_daily(&tc.ctx, "04:30").await.unwrap();

    {
        let executed = tc.executed.lock().unwrap();
        assert_eq!(executed.len(), 1);

        let argv = &executed[0].argv;
        assert_eq!(argv[0], "schtasks");
        assert!(argv.contains(&"/Create".to_string()));
        assert!(argv.contains(&"DAILY".to_string()));
        assert!(argv.contains(&"HIGHEST".to_string()));

        let tn = argv.iter().position(|a| a == "/TN").unwrap();
        assert_eq!(argv[tn + 1], "MaintenanceTool");
        let st = argv.iter().position(|a| a == "/ST").unwrap();
        assert_eq!(argv[st + 1], "04:30");
        // The re-invocation target follows /TR.
        let tr = argv.iter().position(|a| a == "/TR").unwrap();
        assert!(!argv[tr + 1].is_empty());
    }

    // Registration commands always run to completion.
    assert_eq!(*tc.policies.lock().unwrap(), [false]);

    let records = read_records(&tc.ctx.log);
    assert!(records.iter().any(|r| r.message == "task scheduler exit code: 0"));
}

#[tokio::test]
async fn remove_builds_the_expected_command() {
    init_tracing();
    let tc = test_context(false);

    schedule::remove(&tc.ctx).await.unwrap();

    let executed = tc.executed.lock().unwrap();
    assert_eq!(executed.len(), 1);
    let argv = &executed[0].argv;
    assert_eq!(argv[..4], ["schtasks", "/Delete", "/F", "/TN"]);
    assert_eq!(argv[4], "MaintenanceTool");
}
