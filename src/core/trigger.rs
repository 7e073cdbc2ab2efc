//! Trigger events and publish eligibility

use serde::{Deserialize, Serialize};

/// The event that started a deploy run
///
/// Immutable once the run starts. Eligibility for the publish step is
/// derived from it exactly once, before any step executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TriggerEvent {
    /// A push to a branch
    Push { branch: String },

    /// A manual invocation; runs the pipeline but never publishes
    Manual,
}

impl TriggerEvent {
    /// True iff this event allows the publish step to run
    ///
    /// Only a push whose branch equals the configured publish branch is
    /// eligible. Manual dispatch never is.
    pub fn publish_eligible(&self, publish_branch: &str) -> bool {
        match self {
            TriggerEvent::Push { branch } => branch == publish_branch,
            TriggerEvent::Manual => false,
        }
    }

    /// The branch this event checks out, if it names one
    pub fn branch(&self) -> Option<&str> {
        match self {
            TriggerEvent::Push { branch } => Some(branch),
            TriggerEvent::Manual => None,
        }
    }

    /// Short label for logs and run history
    pub fn label(&self) -> String {
        match self {
            TriggerEvent::Push { branch } => format!("push:{}", branch),
            TriggerEvent::Manual => "manual".to_string(),
        }
    }
}
