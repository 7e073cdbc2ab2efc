//! Workspace checkout step

use crate::core::{RunContext, StepKind};
use crate::runner::{ToolInvocation, ToolRunner};
use crate::steps::{transport_failure, DeployStep, StepError};
use async_trait::async_trait;
use tracing::info;

/// Materializes the repository into a fresh ephemeral workspace
///
/// The workspace directory is owned by the run context; it disappears when
/// the run ends, taking every later step's artifacts with it.
#[derive(Debug, Clone)]
pub struct WorkspaceCheckout {
    repository: String,
    branch: Option<String>,
}

impl WorkspaceCheckout {
    pub fn new(repository: String, branch: Option<String>) -> Self {
        Self { repository, branch }
    }
}

#[async_trait]
impl DeployStep for WorkspaceCheckout {
    fn kind(&self) -> StepKind {
        StepKind::Checkout
    }

    async fn run(&self, runner: &dyn ToolRunner, ctx: &mut RunContext) -> Result<(), StepError> {
        let workspace = tempfile::Builder::new()
            .prefix("deployline-")
            .tempdir()
            .map_err(|e| StepError::Checkout(format!("could not create workspace: {}", e)))?;

        let mut invocation = ToolInvocation::new("git")
            .args(["clone", "--depth", "1"])
            .env("GIT_TERMINAL_PROMPT", "0");
        if let Some(branch) = &self.branch {
            invocation = invocation.args(["--branch", branch.as_str()]);
        }
        let invocation = invocation
            .arg(self.repository.as_str())
            .arg(workspace.path().to_string_lossy().into_owned());

        let output = runner
            .run(&invocation)
            .await
            .map_err(|e| StepError::Checkout(transport_failure(e)))?;

        if !output.success() {
            return Err(StepError::Checkout(format!(
                "git clone exited with code {}: {}",
                output.code,
                output.diagnostics()
            )));
        }

        info!(
            "checked out {} into {}",
            self.repository,
            workspace.path().display()
        );
        ctx.set_workspace(workspace);
        Ok(())
    }
}
