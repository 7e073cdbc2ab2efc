//! deployline - a deployment pipeline runner for static sites

pub mod cli;
pub mod core;
pub mod execution;
pub mod history;
pub mod runner;
pub mod steps;

// Re-export commonly used types
pub use self::core::{
    Credential, DeployConfig, DeployRun, RunContext, RunOutcome, RunPhase, RunState, StepKind,
    TriggerEvent,
};
pub use execution::{ExecutionEngine, RunEvent};
pub use runner::{SystemRunner, ToolError, ToolInvocation, ToolOutput, ToolRunner};
pub use steps::{DeployStep, StepError};
