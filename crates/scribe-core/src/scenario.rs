//! Scenario metadata and outcome

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// What the lifecycle hooks know about a running scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMeta {
    /// Title from the `Feature:` line.
    pub feature_name: String,
    /// Feature file name without directory and `.feature` extension.
    pub feature_file: String,
    pub feature_path: Option<PathBuf>,
    /// Correlation id shared by every scenario of the feature in this run.
    pub feature_id: Uuid,
    pub scenario_name: String,
    /// `CT-<n>` tag or the undefined label.
    pub tag: String,
    pub classification: Option<String>,
    pub started_at: String,
    pub finished_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioOutcome {
    Passed,
    Failed { narrative: Option<String> },
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, ScenarioOutcome::Passed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScenarioOutcome::Passed => "PASSED",
            ScenarioOutcome::Failed { .. } => "FAILED",
        }
    }

    pub fn narrative(&self) -> Option<&str> {
        match self {
            ScenarioOutcome::Passed => None,
            ScenarioOutcome::Failed { narrative } => narrative.as_deref(),
        }
    }
}
