//! Run report
//!
//! Every finished scenario is recorded with its evidence embedded as base64,
//! so the report alone is enough to review a run.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDateTime;
use evidence_renderer::RenderedArtifact;
use scribe_core::{Result, RunSummary, ScenarioMeta, ScenarioOutcome};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub path: PathBuf,
    pub data_base64: String,
}

impl Attachment {
    /// Reads the rendered file. `None` when it is gone or unreadable.
    pub fn from_artifact(artifact: &RenderedArtifact) -> Option<Self> {
        if !artifact.path.exists() {
            return None;
        }
        match fs::read(&artifact.path) {
            Ok(bytes) => Some(Self {
                name: artifact
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                mime_type: artifact.format.mime_type().to_string(),
                path: artifact.path.clone(),
                data_base64: STANDARD.encode(bytes),
            }),
            Err(err) => {
                error!(path = %artifact.path.display(), error = %err, "Evidence could not be attached");
                None
            }
        }
    }

    pub fn decode(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data_base64).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub feature: String,
    pub feature_id: String,
    pub scenario: String,
    pub tag: String,
    pub classification: Option<String>,
    pub status: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub failure: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl ScenarioRecord {
    pub fn new(meta: &ScenarioMeta, outcome: &ScenarioOutcome, attachments: Vec<Attachment>) -> Self {
        Self {
            feature: meta.feature_name.clone(),
            feature_id: meta.feature_id.to_string(),
            scenario: meta.scenario_name.clone(),
            tag: meta.tag.clone(),
            classification: meta.classification.clone(),
            status: outcome.label().to_string(),
            started_at: meta.started_at.clone(),
            finished_at: meta.finished_at.clone(),
            failure: outcome.narrative().map(str::to_string),
            attachments,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == "PASSED"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub summary: Option<RunSummary>,
    pub scenarios: Vec<ScenarioRecord>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ScenarioRecord) {
        self.scenarios.push(record);
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Writes the report as pretty JSON, creating the directory if needed.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), scenarios = self.len(), "Run report written");
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

/// Renames `<dir>/reports.json` to `<dir>/<yyyyMMdd_HHmmss>.json`.
///
/// A missing report is not an error and yields `None`.
pub fn rename_with_timestamp(report_dir: &Path, at: NaiveDateTime) -> Result<Option<PathBuf>> {
    let source = report_dir.join(scribe_core::paths::REPORT_FILE);
    if !source.exists() {
        info!(path = %source.display(), "No run report to rename");
        return Ok(None);
    }

    let target = report_dir.join(format!("{}.json", at.format("%Y%m%d_%H%M%S")));
    fs::rename(&source, &target)?;
    info!(to = %target.display(), "Run report renamed");
    Ok(Some(target))
}
