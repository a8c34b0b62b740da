//! Legacy per-run stage-status file
//!
//! Review and engine stages mark their sub-steps `done` here so that a resume
//! within a single workflow state can skip work that already committed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Status of a sub-step within a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Pending,
    Done,
}

/// Mirror of the `run_state.json` file kept inside the run directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    /// Sub-step name -> status
    #[serde(default)]
    pub stages: BTreeMap<String, StageStatus>,

    /// ISO 8601 timestamp of the last update
    pub updated_at: String,
}

impl Default for RunState {
    fn default() -> Self {
        RunState {
            stages: BTreeMap::new(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl RunState {
    /// Check whether a sub-step has already completed
    pub fn is_done(&self, stage: &str) -> bool {
        matches!(self.stages.get(stage), Some(StageStatus::Done))
    }

    /// Return a new RunState with the given sub-step marked done
    pub fn with_done(mut self, stage: &str) -> Self {
        self.stages.insert(stage.to_string(), StageStatus::Done);
        self.updated_at = chrono::Utc::now().to_rfc3339();
        self
    }

    /// Return a new RunState with the given sub-step reset to pending
    pub fn with_pending(mut self, stage: &str) -> Self {
        self.stages.insert(stage.to_string(), StageStatus::Pending);
        self.updated_at = chrono::Utc::now().to_rfc3339();
        self
    }
}
