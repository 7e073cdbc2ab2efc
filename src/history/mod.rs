//! Run history persistence

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteRunStore;

use crate::core::{DeployRun, RunOutcome, RunPhase};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of a finished (or failed) deploy run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique run ID
    pub run_id: Uuid,

    /// Pipeline name
    pub pipeline: String,

    /// Trigger label, e.g. `push:main` or `manual`
    pub trigger: String,

    /// Phase the run reached
    pub phase: RunPhase,

    /// Observable outcome
    pub outcome: RunOutcome,

    /// Diagnostic from the failing step, if the run failed
    pub failure: Option<String>,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run reached its terminal phase
    pub completed_at: Option<DateTime<Utc>>,
}

/// Trait for history backends
#[async_trait::async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Save a run record
    async fn save_run(&self, record: &RunRecord) -> Result<()>;

    /// Load a run by ID
    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunRecord>>;

    /// List all runs for a pipeline
    async fn list_runs(&self, pipeline: &str) -> Result<Vec<RunRecord>>;

    /// List all pipeline names seen in history
    async fn list_pipelines(&self) -> Result<Vec<String>>;
}

/// In-memory history (for `--no-history` runs and tests)
pub struct InMemoryHistory {
    runs: tokio::sync::RwLock<std::collections::HashMap<Uuid, RunRecord>>,
    by_pipeline: tokio::sync::RwLock<std::collections::HashMap<String, Vec<Uuid>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            runs: tokio::sync::RwLock::new(std::collections::HashMap::new()),
            by_pipeline: tokio::sync::RwLock::new(std::collections::HashMap::new()),
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HistoryBackend for InMemoryHistory {
    async fn save_run(&self, record: &RunRecord) -> Result<()> {
        let mut runs = self.runs.write().await;
        runs.insert(record.run_id, record.clone());

        let mut by_pipeline = self.by_pipeline.write().await;
        by_pipeline
            .entry(record.pipeline.clone())
            .or_insert_with(Vec::new)
            .push(record.run_id);

        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunRecord>> {
        let runs = self.runs.read().await;
        Ok(runs.get(&run_id).cloned())
    }

    async fn list_runs(&self, pipeline: &str) -> Result<Vec<RunRecord>> {
        let runs = self.runs.read().await;
        let by_pipeline = self.by_pipeline.read().await;

        if let Some(ids) = by_pipeline.get(pipeline) {
            let mut result = Vec::new();
            for id in ids {
                if let Some(record) = runs.get(id) {
                    result.push(record.clone());
                }
            }
            Ok(result)
        } else {
            Ok(Vec::new())
        }
    }

    async fn list_pipelines(&self) -> Result<Vec<String>> {
        let by_pipeline = self.by_pipeline.read().await;
        Ok(by_pipeline.keys().cloned().collect())
    }
}

/// Create a record from a finished run
pub fn create_record(run: &DeployRun) -> RunRecord {
    RunRecord {
        run_id: run.state.run_id,
        pipeline: run.name().to_string(),
        trigger: run.trigger.label(),
        phase: run.state.phase,
        outcome: run.state.outcome().unwrap_or(RunOutcome::Failed),
        failure: run.state.failure.clone(),
        started_at: run.state.started_at.unwrap_or_else(Utc::now),
        completed_at: run.state.completed_at,
    }
}
