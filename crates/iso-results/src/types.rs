//! Ledger record types.

use serde::{Deserialize, Serialize};

/// Written once a stage finishes successfully.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageManifest {
    pub stage: String,
    /// Hash of the configuration the stage ran with.
    pub config_hash: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub tool_version: String,
    /// Files the stage produced, relative to the work directory.
    #[serde(default)]
    pub artifacts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<StageSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum StageSummary {
    Geometry {
        nx: usize,
        ny: usize,
        calved_cells: usize,
    },
    SshAdjustment {
        iterations: usize,
        mode: String,
        final_max_delta_ssh: Option<f64>,
    },
    Forcing {
        n_time: usize,
        n_cells: usize,
    },
}

impl StageManifest {
    pub fn new(stage: impl Into<String>, config_hash: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            config_hash: config_hash.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            artifacts: Vec::new(),
            summary: None,
        }
    }

    pub fn with_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifacts.push(artifact.into());
        self
    }

    pub fn with_summary(mut self, summary: StageSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}
