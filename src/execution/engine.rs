//! Main execution engine - drives one deploy run end to end

use crate::core::{Credential, DeployRun, RunContext, RunOutcome, RunPhase, StepKind, TriggerEvent};
use crate::runner::ToolRunner;
use crate::steps::build_steps;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that occur during a run
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted {
        run_id: Uuid,
        pipeline: String,
        trigger: String,
    },
    StepStarted {
        kind: StepKind,
    },
    StepCompleted {
        kind: StepKind,
        phase: RunPhase,
    },
    StepFailed {
        kind: StepKind,
        error: String,
    },
    PublishSkipped {
        reason: String,
    },
    RunCancelled {
        before: StepKind,
    },
    RunFinished {
        run_id: Uuid,
        outcome: RunOutcome,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(RunEvent) + Send + Sync>;

/// Drives the fixed step sequence of a deploy run
///
/// Strictly sequential: each step blocks until it completes or fails, the
/// first failure aborts everything after it, and the publish step is gated
/// on the eligibility flag computed from the trigger before any step runs.
pub struct ExecutionEngine<R> {
    runner: Arc<R>,
    handlers: Vec<EventHandler>,
    interrupted: Arc<AtomicBool>,
    credential_override: Option<Credential>,
}

impl<R: ToolRunner + 'static> ExecutionEngine<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner: Arc::new(runner),
            handlers: Vec::new(),
            interrupted: Arc::new(AtomicBool::new(false)),
            credential_override: None,
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(RunEvent) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
    }

    /// Use a fixed credential instead of reading the configured env var
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential_override = Some(credential);
        self
    }

    /// Flag the host can set to cancel the run at the next step boundary
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    fn emit(&self, event: RunEvent) {
        for handler in &self.handlers {
            handler(event.clone());
        }
    }

    fn skip_reason(&self, run: &DeployRun) -> String {
        match &run.trigger {
            TriggerEvent::Push { branch } => format!(
                "push to '{}' does not target publish branch '{}'",
                branch, run.config.publish_branch
            ),
            TriggerEvent::Manual => "manual dispatch never publishes".to_string(),
        }
    }

    /// Execute the run to its terminal state
    ///
    /// Always returns an outcome; step failures are outcomes, not errors.
    /// The ephemeral workspace is dropped before this returns, whatever
    /// happened.
    pub async fn execute(&self, run: &mut DeployRun) -> RunOutcome {
        let run_id = run.state.run_id;
        let eligible = run.publish_eligible();

        info!(
            "starting run {} for {} ({}, publish-eligible: {})",
            run_id,
            run.name(),
            run.trigger.label(),
            eligible
        );
        self.emit(RunEvent::RunStarted {
            run_id,
            pipeline: run.name().to_string(),
            trigger: run.trigger.label(),
        });

        run.state.start();

        let mut ctx = RunContext::new();
        if eligible {
            let credential = match &self.credential_override {
                Some(credential) => Some(credential.clone()),
                None => Credential::from_env(&run.config.publish.token_env),
            };
            match credential {
                Some(credential) => ctx.set_credential(credential),
                None => warn!(
                    "publish-eligible run has no credential in ${}",
                    run.config.publish.token_env
                ),
            }
        }

        let steps = build_steps(&run.config, &run.trigger);
        for step in steps {
            let kind = step.kind();

            if self.interrupted.load(Ordering::SeqCst) {
                warn!("run {} cancelled before {}", run_id, kind.label());
                run.state.cancel();
                self.emit(RunEvent::RunCancelled { before: kind });
                let outcome = RunOutcome::Failed;
                self.emit(RunEvent::RunFinished { run_id, outcome });
                return outcome;
            }

            if kind == StepKind::Publish && !eligible {
                let reason = self.skip_reason(run);
                info!("skipping publish: {}", reason);
                run.state.skip_publish();
                self.emit(RunEvent::PublishSkipped { reason });
                break;
            }

            info!("step {} started", kind.label());
            self.emit(RunEvent::StepStarted { kind });

            match step.run(self.runner.as_ref(), &mut ctx).await {
                Ok(()) => {
                    run.state.complete_step(kind);
                    info!("step {} completed ({:?})", kind.label(), run.state.phase);
                    self.emit(RunEvent::StepCompleted {
                        kind,
                        phase: run.state.phase,
                    });
                }
                Err(e) => {
                    let message = e.to_string();
                    error!("step {} failed: {}", kind.label(), message);
                    run.state.fail(kind, message.clone());
                    self.emit(RunEvent::StepFailed {
                        kind,
                        error: message,
                    });
                    let outcome = RunOutcome::Failed;
                    self.emit(RunEvent::RunFinished { run_id, outcome });
                    return outcome;
                }
            }
        }

        let outcome = run.state.outcome().unwrap_or(RunOutcome::Failed);
        info!("run {} finished: {}", run_id, outcome);
        self.emit(RunEvent::RunFinished { run_id, outcome });
        outcome
    }
}
