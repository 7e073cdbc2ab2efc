//! Test utility functions for deployline scenarios

use async_trait::async_trait;
use deployline::core::{Credential, DeployConfig, DeployRun, RunOutcome, RunPhase, StepKind, TriggerEvent};
use deployline::execution::{ExecutionEngine, RunEvent};
use deployline::runner::{ToolError, ToolInvocation, ToolOutput, ToolRunner};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Effect = Box<dyn Fn(&ToolInvocation) + Send + Sync>;

/// One scripted answer for one tool invocation
pub struct ScriptedCall {
    outcome: Result<ToolOutput, ToolError>,
    effect: Option<Effect>,
}

/// Invocation succeeds with exit code 0 and no output
pub fn ok() -> ScriptedCall {
    ScriptedCall {
        outcome: Ok(ToolOutput {
            code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }),
        effect: None,
    }
}

/// Invocation succeeds and runs a filesystem side effect first
pub fn ok_with<F>(effect: F) -> ScriptedCall
where
    F: Fn(&ToolInvocation) + Send + Sync + 'static,
{
    ScriptedCall {
        outcome: Ok(ToolOutput {
            code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }),
        effect: Some(Box::new(effect)),
    }
}

/// Invocation exits non-zero with the given stderr
pub fn fail(code: i32, stderr: &str) -> ScriptedCall {
    ScriptedCall {
        outcome: Ok(ToolOutput {
            code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }),
        effect: None,
    }
}

/// Invocation cannot even be spawned (tool not installed)
pub fn spawn_error(program: &str) -> ScriptedCall {
    ScriptedCall {
        outcome: Err(ToolError::Spawn {
            program: program.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        }),
        effect: None,
    }
}

/// A successful build invocation: creates `dist/` with a page in it
pub fn build_ok() -> ScriptedCall {
    ok_with(|invocation| {
        let dist = invocation
            .cwd
            .as_ref()
            .expect("build runs in the workspace")
            .join("dist");
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("index.html"), "<html><body>site</body></html>").unwrap();
    })
}

/// Script for steps checkout through postprocess succeeding:
/// git clone, rustup install, rustup target add, cargo install, build
pub fn provision_script() -> Vec<ScriptedCall> {
    vec![ok(), ok(), ok(), ok(), build_ok()]
}

/// Script for the publish step succeeding: git init, add, commit, push
pub fn publish_script() -> Vec<ScriptedCall> {
    vec![ok(), ok(), ok(), ok()]
}

/// Script for a fully successful eligible run
pub fn full_publish_script() -> Vec<ScriptedCall> {
    let mut script = provision_script();
    script.extend(publish_script());
    script
}

/// Publish script whose final push captures the marker file content as the
/// hosting branch would receive it
pub fn publish_script_capturing_marker(slot: Arc<Mutex<Option<String>>>) -> Vec<ScriptedCall> {
    vec![
        ok(),
        ok(),
        ok(),
        ok_with(move |invocation| {
            let path = invocation
                .cwd
                .as_ref()
                .expect("push runs in the output directory")
                .join("CNAME");
            *slot.lock().unwrap() = std::fs::read_to_string(path).ok();
        }),
    ]
}

/// Tool runner that answers invocations from a script, in order
#[derive(Clone)]
pub struct MockRunner {
    script: Arc<Mutex<VecDeque<ScriptedCall>>>,
    invocations: Arc<Mutex<Vec<ToolInvocation>>>,
}

impl MockRunner {
    pub fn new(script: Vec<ScriptedCall>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every invocation seen so far, in order
    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Program names of every invocation, in order
    pub fn programs(&self) -> Vec<String> {
        self.invocations().iter().map(|i| i.program.clone()).collect()
    }

    /// Whether a `git push` was ever issued
    pub fn pushed(&self) -> bool {
        self.invocations().iter().any(|i| {
            i.program == "git" && i.args.first().map(String::as_str) == Some("push")
        })
    }
}

#[async_trait]
impl ToolRunner for MockRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        self.invocations.lock().unwrap().push(invocation.clone());

        let call = self.script.lock().unwrap().pop_front();
        match call {
            Some(call) => {
                if let Some(effect) = &call.effect {
                    effect(invocation);
                }
                call.outcome
            }
            None => Err(ToolError::Spawn {
                program: invocation.program.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "mock script exhausted",
                ),
            }),
        }
    }
}

/// Result of running a deploy against the mock runner
pub struct DeployTestResult {
    pub run: DeployRun,
    pub outcome: RunOutcome,
    pub runner: MockRunner,
    pub events: Vec<RunEvent>,
}

impl DeployTestResult {
    /// Steps that emitted StepCompleted, in order
    pub fn completed_steps(&self) -> Vec<StepKind> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::StepCompleted { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    /// Steps that emitted StepStarted, in order
    pub fn started_steps(&self) -> Vec<StepKind> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::StepStarted { kind } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    /// The PublishSkipped reason, if the publish step was gated off
    pub fn skip_reason(&self) -> Option<String> {
        self.events.iter().find_map(|e| match e {
            RunEvent::PublishSkipped { reason } => Some(reason.clone()),
            _ => None,
        })
    }

    pub fn count_program(&self, program: &str) -> usize {
        self.runner
            .invocations()
            .iter()
            .filter(|i| i.program == program)
            .count()
    }
}

/// Stock configuration pointed at an example repository
pub fn test_config() -> DeployConfig {
    DeployConfig::for_repository("https://github.com/example/site.git")
}

/// Run a deploy with the stock config, a trigger, and a scripted runner
pub async fn run_deploy_with_mock(
    trigger: TriggerEvent,
    script: Vec<ScriptedCall>,
) -> DeployTestResult {
    run_deploy_with_config(test_config(), trigger, script).await
}

/// Run a deploy with an explicit config
pub async fn run_deploy_with_config(
    config: DeployConfig,
    trigger: TriggerEvent,
    script: Vec<ScriptedCall>,
) -> DeployTestResult {
    let runner = MockRunner::new(script);
    let mut run = DeployRun::new(config, trigger);

    let events: Arc<Mutex<Vec<RunEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    let mut engine =
        ExecutionEngine::new(runner.clone()).with_credential(Credential::new("test-token"));
    engine.add_event_handler(move |event| sink.lock().unwrap().push(event));

    let outcome = engine.execute(&mut run).await;
    let events = events.lock().unwrap().clone();

    DeployTestResult {
        run,
        outcome,
        runner,
        events,
    }
}

/// Assert the run ended with the expected outcome
pub fn assert_outcome(result: &DeployTestResult, expected: RunOutcome) {
    assert_eq!(
        result.outcome, expected,
        "expected outcome {:?}, run ended in phase {:?} (failure: {:?})",
        expected, result.run.state.phase, result.run.state.failure
    );
}

/// Assert the run ended in the expected phase
pub fn assert_phase(result: &DeployTestResult, expected: RunPhase) {
    assert_eq!(
        result.run.state.phase, expected,
        "expected phase {:?}, failure: {:?}",
        expected, result.run.state.failure
    );
}

/// Assert the run failed at the given step with a matching diagnostic
pub fn assert_failed_at(result: &DeployTestResult, step: StepKind, fragment: &str) {
    assert_outcome(result, RunOutcome::Failed);
    assert_eq!(result.run.state.failed_step, Some(step));

    let failure = result
        .run
        .state
        .failure
        .as_deref()
        .unwrap_or_else(|| panic!("run failed at {:?} without a diagnostic", step));
    assert!(
        failure.contains(fragment),
        "diagnostic for {:?}:\n{}\n\ndoes not contain:\n{}",
        step,
        failure,
        fragment
    );
}

/// Assert no publish was ever attempted
pub fn assert_never_published(result: &DeployTestResult) {
    assert!(
        !result.runner.pushed(),
        "git push was issued: {:?}",
        result.runner.programs()
    );
    assert!(
        !result.started_steps().contains(&StepKind::Publish),
        "publish step was started"
    );
}
