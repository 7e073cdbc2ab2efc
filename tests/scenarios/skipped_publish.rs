//! Scenario: push to a non-publish branch with a successful build

use crate::helpers::*;
use deployline::core::{RunOutcome, RunPhase, StepKind, TriggerEvent};

fn push_to_feature() -> TriggerEvent {
    TriggerEvent::Push {
        branch: "feature-x".to_string(),
    }
}

#[tokio::test]
async fn test_push_to_other_branch_skips_publish() {
    let result = run_deploy_with_mock(push_to_feature(), provision_script()).await;

    assert_outcome(&result, RunOutcome::Skipped);
    assert_phase(&result, RunPhase::Skipped);
    assert_never_published(&result);

    let reason = result.skip_reason().expect("a skip reason");
    assert!(reason.contains("feature-x"));
    assert!(reason.contains("main"));
}

#[tokio::test]
async fn test_skipped_run_still_runs_every_earlier_step() {
    let result = run_deploy_with_mock(push_to_feature(), provision_script()).await;

    assert_eq!(
        result.completed_steps(),
        vec![
            StepKind::Checkout,
            StepKind::Toolchain,
            StepKind::Helper,
            StepKind::Build,
            StepKind::Postprocess,
        ]
    );
    assert_eq!(result.count_program("trunk"), 1);
    assert_eq!(result.count_program("cargo"), 1);
}

#[tokio::test]
async fn test_skipped_run_issues_no_publish_invocations() {
    let result = run_deploy_with_mock(push_to_feature(), provision_script()).await;

    // The only git invocation is the clone; the publish sequence never starts
    assert_eq!(result.count_program("git"), 1);
}
