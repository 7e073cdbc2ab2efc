//! CLI command definitions

use crate::core::TriggerEvent;
use clap::Args;

/// Run a deploy
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to deploy YAML file
    #[arg(short, long, default_value = "deploy.yml")]
    pub file: String,

    /// Trigger: a push to the named branch
    #[arg(long, conflicts_with = "manual")]
    pub branch: Option<String>,

    /// Trigger: manual dispatch (runs the pipeline, never publishes)
    #[arg(long)]
    pub manual: bool,

    /// Don't save the run to history
    #[arg(long)]
    pub no_history: bool,
}

impl RunCommand {
    /// Build the trigger event from the flags
    pub fn trigger(&self) -> Result<TriggerEvent, String> {
        match (&self.branch, self.manual) {
            (Some(branch), false) => Ok(TriggerEvent::Push {
                branch: branch.clone(),
            }),
            (None, true) => Ok(TriggerEvent::Manual),
            (None, false) => {
                Err("specify a trigger: --branch <name> or --manual".to_string())
            }
            (Some(_), true) => Err("--branch and --manual are mutually exclusive".to_string()),
        }
    }
}

/// Validate a deploy configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to deploy YAML file
    #[arg(short, long, default_value = "deploy.yml")]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show run history
#[derive(Debug, Args, Clone)]
pub struct HistoryCommand {
    /// Pipeline name to filter by
    #[arg(short, long)]
    pub pipeline: Option<String>,

    /// Number of recent runs to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Show full details
    #[arg(long)]
    pub verbose: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show a specific run by ID
    #[arg(long)]
    pub run_id: Option<String>,
}

/// List pipelines seen in history
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Show run counts
    #[arg(long)]
    pub with_counts: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
