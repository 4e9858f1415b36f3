//! File-backed forward model and archive for the SSH adjustment loop.
//!
//! The equilibrator keeps the state in memory; these adapters put each
//! iteration's state where the model expects it (`init.nc`) and keep the
//! numbered copies and per-iteration logs for inspection.

use std::fs;
use std::path::Path;

use iso_adjust::{
    AdjustError, AdjustResult, ForwardModel, IterationReport, IterationState, ModelOutput,
    StateArchive, log_file_name,
};
use iso_io::iteration_file_name;
use iso_project::Stage;
use iso_results::RunLedger;
use tracing::debug;

use crate::collaborators::{Collaborators, ProcessRunner, run_model};
use crate::error::{AppError, AppResult};
use crate::progress::{Reporter, StageStep};
use crate::workdir::{INIT_FILE, OUTPUT_SSH_FILE, point_to};

/// Runs the external model on `init{i}.nc` and reads `output_ssh.nc`.
pub struct FileModel<'a, 'p> {
    runner: &'a mut dyn ProcessRunner,
    tools: Collaborators<'a>,
    work_dir: &'a Path,
    reporter: &'a mut Reporter<'p>,
    total: usize,
    failure: Option<AppError>,
}

impl<'a, 'p> FileModel<'a, 'p> {
    pub fn new(
        runner: &'a mut dyn ProcessRunner,
        tools: Collaborators<'a>,
        work_dir: &'a Path,
        reporter: &'a mut Reporter<'p>,
        total: usize,
    ) -> Self {
        Self {
            runner,
            tools,
            work_dir,
            reporter,
            total,
            failure: None,
        }
    }

    /// The error behind the last `AdjustError::Model`, if any.
    pub fn take_failure(&mut self) -> Option<AppError> {
        self.failure.take()
    }

    fn run_iteration(&mut self, iteration: usize) -> AppResult<ModelOutput> {
        self.reporter.emit(
            StageStep::Adjusting {
                iteration,
                total: self.total,
            },
            None,
        );
        point_to(self.work_dir, INIT_FILE, &iteration_file_name(iteration))?;

        // never read a previous iteration's output
        let output_path = self.work_dir.join(OUTPUT_SSH_FILE);
        if output_path.exists() {
            fs::remove_file(&output_path)?;
        }

        run_model(&mut *self.runner, &self.tools, Stage::SshAdjustment)?;
        Ok(iso_io::read_model_output(&output_path)?)
    }
}

impl ForwardModel for FileModel<'_, '_> {
    fn integrate(&mut self, iteration: usize, _state: &IterationState) -> AdjustResult<ModelOutput> {
        self.run_iteration(iteration).map_err(|e| {
            let message = e.to_string();
            self.failure = Some(e);
            AdjustError::Model { iteration, message }
        })
    }
}

/// Writes `init{i}.nc`, `maxDeltaSSH_{iii}.log` and the ledger history.
pub struct FileArchive<'a> {
    work_dir: &'a Path,
    ledger: &'a RunLedger,
    failure: Option<AppError>,
}

impl<'a> FileArchive<'a> {
    pub fn new(work_dir: &'a Path, ledger: &'a RunLedger) -> Self {
        Self {
            work_dir,
            ledger,
            failure: None,
        }
    }

    pub fn take_failure(&mut self) -> Option<AppError> {
        self.failure.take()
    }

    fn record<T>(&mut self, result: AppResult<T>) -> AdjustResult<T> {
        result.map_err(|e| {
            let message = e.to_string();
            self.failure = Some(e);
            AdjustError::Archive { message }
        })
    }

    fn write_state(&self, iteration: usize, state: &IterationState) -> AppResult<()> {
        let name = iteration_file_name(iteration);
        if iteration > 0 {
            let previous = self.work_dir.join(iteration_file_name(iteration - 1));
            let path = self.work_dir.join(&name);
            iso_io::copy_state_file(&previous, &path)?;
            iso_io::write_iteration_state(&path, state)?;
            debug!(file = %name, "wrote corrected state");
        }
        point_to(self.work_dir, INIT_FILE, &name)
    }

    fn write_report(&self, report: &IterationReport) -> AppResult<()> {
        if let Some(max) = &report.max_delta {
            fs::write(
                self.work_dir.join(log_file_name(report.iteration)),
                format!("{max}\n"),
            )?;
        }
        self.ledger.append_iteration(report)?;
        Ok(())
    }
}

impl StateArchive for FileArchive<'_> {
    fn store_state(&mut self, iteration: usize, state: &IterationState) -> AdjustResult<()> {
        let result = self.write_state(iteration, state);
        self.record(result)
    }

    fn store_report(&mut self, report: &IterationReport) -> AdjustResult<()> {
        let result = self.write_report(report);
        self.record(result)
    }
}
