//! Build execution step

use crate::core::{RunContext, StepKind};
use crate::runner::{ToolInvocation, ToolRunner};
use crate::steps::{transport_failure, DeployStep, StepError};
use async_trait::async_trait;
use tracing::{error, info};

/// Runs the build command in the workspace and locates its output
///
/// Any non-zero exit is fatal; the build tool's full diagnostic output is
/// carried in the error so it reaches the run log verbatim.
#[derive(Debug, Clone)]
pub struct BuildCommand {
    command: String,
    args: Vec<String>,
    output_dir: String,
}

impl BuildCommand {
    pub fn new(command: String, args: Vec<String>, output_dir: String) -> Self {
        Self {
            command,
            args,
            output_dir,
        }
    }
}

#[async_trait]
impl DeployStep for BuildCommand {
    fn kind(&self) -> StepKind {
        StepKind::Build
    }

    async fn run(&self, runner: &dyn ToolRunner, ctx: &mut RunContext) -> Result<(), StepError> {
        let workspace = ctx
            .workspace_path()
            .ok_or_else(|| StepError::Build("workspace has not been checked out".to_string()))?
            .to_path_buf();

        let invocation = ToolInvocation::new(&self.command)
            .args(self.args.iter().cloned())
            .current_dir(&workspace);

        let output = runner
            .run(&invocation)
            .await
            .map_err(|e| StepError::Build(transport_failure(e)))?;

        if !output.success() {
            error!("build command exited with code {}", output.code);
            return Err(StepError::Build(format!(
                "{} exited with code {}:\n{}",
                invocation.command_line(),
                output.code,
                output.diagnostics()
            )));
        }

        let output_dir = workspace.join(&self.output_dir);
        if !output_dir.is_dir() {
            return Err(StepError::Build(format!(
                "build succeeded but output directory {} is missing",
                output_dir.display()
            )));
        }

        info!("build output at {}", output_dir.display());
        ctx.set_output_dir(output_dir);
        Ok(())
    }
}
