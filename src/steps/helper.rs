//! Build-helper provisioning step

use crate::core::{RunContext, StepKind};
use crate::runner::{ToolInvocation, ToolRunner};
use crate::steps::{transport_failure, DeployStep, StepError};
use async_trait::async_trait;
use tracing::info;

/// Installs the build-orchestration tool at a pinned version
#[derive(Debug, Clone)]
pub struct HelperInstall {
    tool: String,
    version: String,
}

impl HelperInstall {
    pub fn new(tool: String, version: String) -> Self {
        Self { tool, version }
    }
}

#[async_trait]
impl DeployStep for HelperInstall {
    fn kind(&self) -> StepKind {
        StepKind::Helper
    }

    async fn run(&self, runner: &dyn ToolRunner, _ctx: &mut RunContext) -> Result<(), StepError> {
        let invocation = ToolInvocation::new("cargo").args([
            "install",
            self.tool.as_str(),
            "--version",
            self.version.as_str(),
            "--locked",
        ]);

        let output = runner
            .run(&invocation)
            .await
            .map_err(|e| StepError::HelperInstall(transport_failure(e)))?;

        if !output.success() {
            return Err(StepError::HelperInstall(format!(
                "cargo install {} exited with code {}: {}",
                self.tool,
                output.code,
                output.diagnostics()
            )));
        }

        info!("helper {} {} installed", self.tool, self.version);
        Ok(())
    }
}
