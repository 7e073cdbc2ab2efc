//! Scenario: the build command exits non-zero

use crate::helpers::*;
use deployline::core::{RunOutcome, RunPhase, StepKind, TriggerEvent};

fn push_to_main() -> TriggerEvent {
    TriggerEvent::Push {
        branch: "main".to_string(),
    }
}

fn failing_build_script() -> Vec<ScriptedCall> {
    vec![
        ok(),
        ok(),
        ok(),
        ok(),
        fail(
            101,
            "error[E0308]: mismatched types\n --> src/main.rs:4:5\nerror: could not compile `site`",
        ),
    ]
}

#[tokio::test]
async fn test_build_failure_aborts_the_run() {
    let result = run_deploy_with_mock(push_to_main(), failing_build_script()).await;

    assert_outcome(&result, RunOutcome::Failed);
    assert_phase(&result, RunPhase::Failed);
    assert_failed_at(&result, StepKind::Build, "exited with code 101");
}

#[tokio::test]
async fn test_build_failure_surfaces_full_diagnostics() {
    let result = run_deploy_with_mock(push_to_main(), failing_build_script()).await;

    let failure = result.run.state.failure.as_deref().unwrap();
    assert!(failure.contains("error[E0308]: mismatched types"));
    assert!(failure.contains("could not compile `site`"));
}

#[tokio::test]
async fn test_build_failure_never_reaches_marker_or_publish() {
    let result = run_deploy_with_mock(push_to_main(), failing_build_script()).await;

    assert_never_published(&result);
    assert!(!result.started_steps().contains(&StepKind::Postprocess));
    assert_eq!(
        result.completed_steps(),
        vec![StepKind::Checkout, StepKind::Toolchain, StepKind::Helper]
    );
}

#[tokio::test]
async fn test_build_missing_output_directory_is_a_build_failure() {
    // Build exits zero but leaves no dist/ behind
    let script = vec![ok(), ok(), ok(), ok(), ok()];
    let result = run_deploy_with_mock(push_to_main(), script).await;

    assert_failed_at(&result, StepKind::Build, "output directory");
    assert_never_published(&result);
}
