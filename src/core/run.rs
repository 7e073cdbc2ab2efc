//! Deploy run domain model

use crate::core::{config::DeployConfig, state::RunState, trigger::TriggerEvent};

/// One execution of the pipeline, from trigger to terminal state
#[derive(Debug, Clone)]
pub struct DeployRun {
    /// Configuration the run executes against
    pub config: DeployConfig,

    /// The event that started the run; fixed for its lifetime
    pub trigger: TriggerEvent,

    /// Run state
    pub state: RunState,
}

impl DeployRun {
    pub fn new(config: DeployConfig, trigger: TriggerEvent) -> Self {
        Self {
            config,
            trigger,
            state: RunState::new(),
        }
    }

    /// Pipeline name, for logs and history
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Whether this run's trigger allows the publish step
    ///
    /// Computed from the trigger alone; nothing that happens during the run
    /// can change it.
    pub fn publish_eligible(&self) -> bool {
        self.trigger.publish_eligible(&self.config.publish_branch)
    }
}
