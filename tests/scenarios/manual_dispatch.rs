//! Scenario: manual dispatch

use crate::helpers::*;
use deployline::core::{RunOutcome, RunPhase, StepKind, TriggerEvent};

#[tokio::test]
async fn test_manual_dispatch_never_publishes() {
    let result = run_deploy_with_mock(TriggerEvent::Manual, provision_script()).await;

    assert_outcome(&result, RunOutcome::Skipped);
    assert_phase(&result, RunPhase::Skipped);
    assert_never_published(&result);

    let reason = result.skip_reason().expect("a skip reason");
    assert!(reason.contains("manual"));
}

#[tokio::test]
async fn test_manual_dispatch_runs_through_postprocess() {
    let result = run_deploy_with_mock(TriggerEvent::Manual, provision_script()).await;

    assert!(result.completed_steps().contains(&StepKind::Postprocess));
    assert_eq!(result.count_program("trunk"), 1);
}

#[tokio::test]
async fn test_manual_dispatch_checks_out_default_branch() {
    let result = run_deploy_with_mock(TriggerEvent::Manual, provision_script()).await;

    let invocations = result.runner.invocations();
    let clone = &invocations[0];
    assert_eq!(clone.program, "git");
    assert!(!clone.args.contains(&"--branch".to_string()));
}

#[tokio::test]
async fn test_manual_dispatch_failure_still_reported() {
    // A manual run that fails is Failed, not Skipped: skipping only applies
    // to the publish gate of a run that got that far
    let script = vec![ok(), ok(), ok(), ok(), fail(1, "error: build broke")];
    let result = run_deploy_with_mock(TriggerEvent::Manual, script).await;

    assert_outcome(&result, RunOutcome::Failed);
    assert_failed_at(&result, StepKind::Build, "build broke");
}
