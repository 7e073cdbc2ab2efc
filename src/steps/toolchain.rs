//! Toolchain provisioning step

use crate::core::{RunContext, StepKind};
use crate::runner::{ToolInvocation, ToolRunner};
use crate::steps::{transport_failure, DeployStep, StepError};
use async_trait::async_trait;
use tracing::info;

/// Installs the compiler toolchain channel and the compilation target
///
/// Both identifiers are configuration constants, not runtime-derived. The
/// target add is a second invocation; either failing is fatal.
#[derive(Debug, Clone)]
pub struct ToolchainInstall {
    channel: String,
    target: String,
}

impl ToolchainInstall {
    pub fn new(channel: String, target: String) -> Self {
        Self { channel, target }
    }
}

#[async_trait]
impl DeployStep for ToolchainInstall {
    fn kind(&self) -> StepKind {
        StepKind::Toolchain
    }

    async fn run(&self, runner: &dyn ToolRunner, _ctx: &mut RunContext) -> Result<(), StepError> {
        let install = ToolInvocation::new("rustup").args([
            "toolchain",
            "install",
            self.channel.as_str(),
            "--profile",
            "minimal",
            "--no-self-update",
        ]);

        let output = runner
            .run(&install)
            .await
            .map_err(|e| StepError::ToolchainInstall(transport_failure(e)))?;
        if !output.success() {
            return Err(StepError::ToolchainInstall(format!(
                "rustup toolchain install exited with code {}: {}",
                output.code,
                output.diagnostics()
            )));
        }

        let add_target = ToolInvocation::new("rustup").args([
            "target",
            "add",
            self.target.as_str(),
            "--toolchain",
            self.channel.as_str(),
        ]);

        let output = runner
            .run(&add_target)
            .await
            .map_err(|e| StepError::ToolchainInstall(transport_failure(e)))?;
        if !output.success() {
            return Err(StepError::ToolchainInstall(format!(
                "rustup target add {} exited with code {}: {}",
                self.target,
                output.code,
                output.diagnostics()
            )));
        }

        info!("toolchain {} ready with target {}", self.channel, self.target);
        Ok(())
    }
}
