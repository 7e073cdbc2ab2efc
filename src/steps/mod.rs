//! The pipeline steps
//!
//! One module per step, each implementing [`DeployStep`] against the tool
//! runner seam. Steps are fatal-on-failure: the engine aborts the run on the
//! first error and nothing is retried.

pub mod build;
pub mod checkout;
pub mod helper;
pub mod postprocess;
pub mod publish;
pub mod toolchain;

use crate::core::{DeployConfig, RunContext, StepKind, TriggerEvent};
use crate::runner::{ToolError, ToolRunner};
use async_trait::async_trait;
use thiserror::Error;

pub use build::BuildCommand;
pub use checkout::WorkspaceCheckout;
pub use helper::HelperInstall;
pub use postprocess::MarkerInjection;
pub use publish::MirrorPublish;
pub use toolchain::ToolchainInstall;

/// Fatal step failures
///
/// One variant per step. None of these are retried or recovered; the first
/// one aborts the run and its message is the run's diagnostic output.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("checkout failed: {0}")]
    Checkout(String),

    #[error("toolchain install failed: {0}")]
    ToolchainInstall(String),

    #[error("helper install failed: {0}")]
    HelperInstall(String),

    #[error("build failed: {0}")]
    Build(String),

    #[error("marker write failed: {0}")]
    Write(String),

    #[error("publish failed: {0}")]
    Publish(String),
}

impl StepError {
    /// The step this error belongs to
    pub fn kind(&self) -> StepKind {
        match self {
            StepError::Checkout(_) => StepKind::Checkout,
            StepError::ToolchainInstall(_) => StepKind::Toolchain,
            StepError::HelperInstall(_) => StepKind::Helper,
            StepError::Build(_) => StepKind::Build,
            StepError::Write(_) => StepKind::Postprocess,
            StepError::Publish(_) => StepKind::Publish,
        }
    }
}

/// A single pipeline step
#[async_trait]
pub trait DeployStep: Send + Sync {
    /// Which of the fixed steps this is
    fn kind(&self) -> StepKind;

    /// Run the step to completion
    ///
    /// Steps communicate only through `ctx`: checkout records the workspace,
    /// build records the output directory, publish reads both.
    async fn run(&self, runner: &dyn ToolRunner, ctx: &mut RunContext) -> Result<(), StepError>;
}

/// Build the fixed step sequence for a run
///
/// The order is the pipeline: checkout, toolchain, helper, build,
/// postprocess, publish. Whether publish actually executes is the engine's
/// decision, not encoded here.
pub fn build_steps(config: &DeployConfig, trigger: &TriggerEvent) -> Vec<Box<dyn DeployStep>> {
    vec![
        Box::new(WorkspaceCheckout::new(
            config.repository.clone(),
            trigger.branch().map(str::to_string),
        )),
        Box::new(ToolchainInstall::new(
            config.toolchain.channel.clone(),
            config.toolchain.target.clone(),
        )),
        Box::new(HelperInstall::new(
            config.helper.tool.clone(),
            config.helper.version.clone(),
        )),
        Box::new(BuildCommand::new(
            config.build.command.clone(),
            config.build.args.clone(),
            config.build.output_dir.clone(),
        )),
        Box::new(MarkerInjection::new(
            config.marker.file_name.clone(),
            config.marker.content.clone(),
        )),
        Box::new(MirrorPublish::new(
            config.publish_remote().to_string(),
            config.publish.branch.clone(),
            config.publish.token_env.clone(),
        )),
    ]
}

/// Render a transport-level tool failure into a step diagnostic
pub(crate) fn transport_failure(error: ToolError) -> String {
    error.to_string()
}
