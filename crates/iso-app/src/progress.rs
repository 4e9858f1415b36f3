use std::time::Instant;

use iso_project::Stage;

#[derive(Debug, Clone, PartialEq)]
pub enum StageStep {
    LoadingConfig,
    UpdatingNamelist,
    ProcessingGeometry,
    ConvertingMesh,
    Partitioning,
    RunningModel,
    CullingMesh,
    Adjusting { iteration: usize, total: usize },
    BuildingForcing,
    Recording,
    Completed,
}

impl StageStep {
    pub fn label(&self) -> String {
        match self {
            StageStep::LoadingConfig => "loading config".to_string(),
            StageStep::UpdatingNamelist => "updating namelist".to_string(),
            StageStep::ProcessingGeometry => "processing geometry".to_string(),
            StageStep::ConvertingMesh => "converting mesh".to_string(),
            StageStep::Partitioning => "partitioning".to_string(),
            StageStep::RunningModel => "running model".to_string(),
            StageStep::CullingMesh => "culling mesh".to_string(),
            StageStep::Adjusting { iteration, total } => {
                format!("ssh adjustment {}/{}", iteration + 1, total)
            }
            StageStep::BuildingForcing => "building forcing".to_string(),
            StageStep::Recording => "recording".to_string(),
            StageStep::Completed => "completed".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageEvent {
    pub stage: Stage,
    pub step: StageStep,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

/// Forwards stage events to an optional callback.
pub struct Reporter<'p> {
    stage: Stage,
    started: Instant,
    callback: Option<&'p mut dyn FnMut(StageEvent)>,
}

impl<'p> Reporter<'p> {
    pub fn new(stage: Stage, callback: Option<&'p mut dyn FnMut(StageEvent)>) -> Self {
        Self {
            stage,
            started: Instant::now(),
            callback,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn elapsed_s(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    pub fn emit(&mut self, step: StageStep, message: Option<String>) {
        let elapsed_wall_s = self.elapsed_s();
        if let Some(cb) = self.callback.as_mut() {
            cb(StageEvent {
                stage: self.stage,
                step,
                elapsed_wall_s,
                message,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_without_callback_is_silent() {
        let mut r = Reporter::new(Stage::Test, None);
        r.emit(StageStep::RunningModel, None);
        assert_eq!(r.stage(), Stage::Test);
    }

    #[test]
    fn reporter_forwards_events() {
        let mut seen = Vec::new();
        let mut cb = |e: StageEvent| seen.push(e.step);
        {
            let mut r = Reporter::new(Stage::SshAdjustment, Some(&mut cb));
            r.emit(StageStep::Adjusting { iteration: 0, total: 3 }, None);
            r.emit(StageStep::Completed, None);
        }
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].label(), "ssh adjustment 1/3");
    }
}
