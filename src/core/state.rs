//! Run state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The six pipeline steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// Materialize the repository into an ephemeral workspace
    Checkout,
    /// Install the compiler toolchain and compilation target
    Toolchain,
    /// Install the build-orchestration helper
    Helper,
    /// Run the build command
    Build,
    /// Inject the marker file into the build output
    Postprocess,
    /// Mirror the output directory to the hosting branch
    Publish,
}

impl StepKind {
    /// Fixed execution order; the pipeline is a sequence, not a graph
    pub const ORDER: [StepKind; 6] = [
        StepKind::Checkout,
        StepKind::Toolchain,
        StepKind::Helper,
        StepKind::Build,
        StepKind::Postprocess,
        StepKind::Publish,
    ];

    /// Short label for logs and display
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::Checkout => "checkout",
            StepKind::Toolchain => "toolchain",
            StepKind::Helper => "helper",
            StepKind::Build => "build",
            StepKind::Postprocess => "postprocess",
            StepKind::Publish => "publish",
        }
    }
}

/// Phase a run has reached
///
/// Advances strictly forward as steps complete. Any fatal step failure
/// jumps to `Failed` from wherever the run was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Run created, nothing executed yet
    Pending,
    /// Workspace materialized
    CheckedOut,
    /// Compiler toolchain and target installed
    ToolchainReady,
    /// Build helper installed
    HelperReady,
    /// Build output directory produced
    Built,
    /// Marker file injected into the output
    PostProcessed,
    /// Output mirrored to the hosting branch
    Published,
    /// Ran fully but was not eligible to publish
    Skipped,
    /// A step failed; everything after it was abandoned
    Failed,
    /// The host cancelled the run at a step boundary
    Cancelled,
}

impl RunPhase {
    /// Check if the run can make no further progress
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunPhase::Published | RunPhase::Skipped | RunPhase::Failed | RunPhase::Cancelled
        )
    }
}

/// Externally observable outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Ran fully and published to the hosting branch
    Published,
    /// Ran fully but was not publish-eligible
    Skipped,
    /// A step failed (or the run was cancelled) before completion
    Failed,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RunOutcome::Published => "succeeded-published",
            RunOutcome::Skipped => "succeeded-skipped",
            RunOutcome::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// State of a single deploy run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Unique run ID
    pub run_id: Uuid,

    /// Phase the run has reached
    pub phase: RunPhase,

    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// When the run reached a terminal phase
    pub completed_at: Option<DateTime<Utc>>,

    /// The step that failed, if any
    pub failed_step: Option<StepKind>,

    /// Diagnostic message from the failing step
    pub failure: Option<String>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            phase: RunPhase::Pending,
            started_at: None,
            completed_at: None,
            failed_step: None,
            failure: None,
        }
    }

    /// Mark the run as started
    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
    }

    /// Record the completion of a step, advancing the phase
    pub fn complete_step(&mut self, step: StepKind) {
        self.phase = match step {
            StepKind::Checkout => RunPhase::CheckedOut,
            StepKind::Toolchain => RunPhase::ToolchainReady,
            StepKind::Helper => RunPhase::HelperReady,
            StepKind::Build => RunPhase::Built,
            StepKind::Postprocess => RunPhase::PostProcessed,
            StepKind::Publish => RunPhase::Published,
        };
        if self.phase.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
    }

    /// Record that the publish step was skipped (trigger not eligible)
    pub fn skip_publish(&mut self) {
        self.phase = RunPhase::Skipped;
        self.completed_at = Some(Utc::now());
    }

    /// Record a fatal step failure
    pub fn fail(&mut self, step: StepKind, error: String) {
        self.phase = RunPhase::Failed;
        self.failed_step = Some(step);
        self.failure = Some(error);
        self.completed_at = Some(Utc::now());
    }

    /// Record cancellation by the host
    pub fn cancel(&mut self) {
        self.phase = RunPhase::Cancelled;
        self.completed_at = Some(Utc::now());
    }

    /// Outcome of the run, once terminal
    ///
    /// A cancelled run reports `Failed`: the observable outcomes are
    /// exactly published, skipped, or failed.
    pub fn outcome(&self) -> Option<RunOutcome> {
        match self.phase {
            RunPhase::Published => Some(RunOutcome::Published),
            RunPhase::Skipped => Some(RunOutcome::Skipped),
            RunPhase::Failed | RunPhase::Cancelled => Some(RunOutcome::Failed),
            _ => None,
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
