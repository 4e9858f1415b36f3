//! On-disk ledger under `<work_dir>/.isomip`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use iso_adjust::IterationReport;

use crate::types::StageManifest;
use crate::{ResultsError, ResultsResult};

const LEDGER_DIR: &str = ".isomip";
const STAGES_DIR: &str = "stages";
const ITERATIONS_FILE: &str = "ssh_adjustment.jsonl";

#[derive(Debug, Clone)]
pub struct RunLedger {
    root_dir: PathBuf,
}

impl RunLedger {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        fs::create_dir_all(root_dir.join(STAGES_DIR))?;
        Ok(Self { root_dir })
    }

    pub fn for_work_dir(work_dir: &Path) -> ResultsResult<Self> {
        if !work_dir.is_dir() {
            return Err(ResultsError::InvalidPath {
                message: format!("{} is not a directory", work_dir.display()),
            });
        }
        Self::new(work_dir.join(LEDGER_DIR))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn stage_path(&self, stage: &str) -> PathBuf {
        self.root_dir.join(STAGES_DIR).join(format!("{stage}.json"))
    }

    fn iterations_path(&self) -> PathBuf {
        self.root_dir.join(ITERATIONS_FILE)
    }

    pub fn has_stage(&self, stage: &str) -> bool {
        self.stage_path(stage).exists()
    }

    /// Recorded with the given configuration hash.
    pub fn is_current(&self, stage: &str, config_hash: &str) -> bool {
        self.load_stage(stage)
            .map(|m| m.config_hash == config_hash)
            .unwrap_or(false)
    }

    pub fn save_stage(&self, manifest: &StageManifest) -> ResultsResult<()> {
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(self.stage_path(&manifest.stage), json)?;
        Ok(())
    }

    pub fn load_stage(&self, stage: &str) -> ResultsResult<StageManifest> {
        let path = self.stage_path(stage);
        if !path.exists() {
            return Err(ResultsError::StageNotFound {
                stage: stage.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// All recorded stages, oldest first.
    pub fn list_stages(&self) -> ResultsResult<Vec<StageManifest>> {
        let mut stages = Vec::new();
        let dir = self.root_dir.join(STAGES_DIR);
        if !dir.exists() {
            return Ok(stages);
        }
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            if let Ok(manifest) = serde_json::from_str::<StageManifest>(&content) {
                stages.push(manifest);
            }
        }
        stages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(stages)
    }

    /// Start a fresh adjustment diagnostic log.
    pub fn reset_iterations(&self) -> ResultsResult<()> {
        let path = self.iterations_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn append_iteration(&self, report: &IterationReport) -> ResultsResult<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.iterations_path())?;
        let line = serde_json::to_string(report)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    pub fn load_iterations(&self) -> ResultsResult<Vec<IterationReport>> {
        let path = self.iterations_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        let mut reports = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                reports.push(serde_json::from_str(line)?);
            }
        }
        Ok(reports)
    }
}
