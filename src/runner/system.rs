//! Tool runner backed by real subprocesses

use crate::runner::{ToolError, ToolInvocation, ToolOutput, ToolRunner};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Default per-invocation timeout when the config does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Runs tools as real subprocesses with a per-invocation timeout
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout_secs: u64,
}

impl SystemRunner {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_SECS)
    }
}

#[async_trait]
impl ToolRunner for SystemRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        debug!("running: {}", invocation.command_line());

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }
        for (key, value) in &invocation.env {
            command.env(key, value);
        }
        command.kill_on_drop(true);

        let result = timeout(Duration::from_secs(self.timeout_secs), command.output())
            .await
            .map_err(|_| ToolError::Timeout {
                program: invocation.program.clone(),
                secs: self.timeout_secs,
            })?;

        let output = result.map_err(|e| ToolError::Spawn {
            program: invocation.program.clone(),
            source: e,
        })?;

        let tool_output = ToolOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            "{} exited with code {} ({} bytes stdout, {} bytes stderr)",
            invocation.program,
            tool_output.code,
            tool_output.stdout.len(),
            tool_output.stderr.len()
        );

        Ok(tool_output)
    }
}
