//! Output post-processing step

use crate::core::{RunContext, StepKind};
use crate::runner::ToolRunner;
use crate::steps::{DeployStep, StepError};
use async_trait::async_trait;
use tracing::info;

/// Writes the marker file into the root of the build output
///
/// The only mutation the output directory sees after the build. Overwrites
/// an existing file of the same name.
#[derive(Debug, Clone)]
pub struct MarkerInjection {
    file_name: String,
    content: String,
}

impl MarkerInjection {
    pub fn new(file_name: String, content: String) -> Self {
        Self { file_name, content }
    }
}

#[async_trait]
impl DeployStep for MarkerInjection {
    fn kind(&self) -> StepKind {
        StepKind::Postprocess
    }

    async fn run(&self, _runner: &dyn ToolRunner, ctx: &mut RunContext) -> Result<(), StepError> {
        let output_dir = ctx
            .output_dir()
            .ok_or_else(|| StepError::Write("build output directory is missing".to_string()))?;

        if !output_dir.is_dir() {
            return Err(StepError::Write(format!(
                "build output directory {} does not exist",
                output_dir.display()
            )));
        }

        let path = output_dir.join(&self.file_name);
        tokio::fs::write(&path, &self.content)
            .await
            .map_err(|e| {
                StepError::Write(format!("could not write {}: {}", path.display(), e))
            })?;

        info!("wrote {} ({})", path.display(), self.content);
        Ok(())
    }
}
