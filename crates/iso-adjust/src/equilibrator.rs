//! Fixed-budget SSH equilibration loop.

use tracing::{info, warn};

use crate::correction::apply_correction;
use crate::diagnostics::{IterationReport, find_max_delta};
use crate::error::AdjustResult;
use crate::mode::CorrectionMode;
use crate::state::{IterationState, ModelOutput};

/// Runs the ocean model from an initial condition and reports the response.
pub trait ForwardModel {
    fn integrate(&mut self, iteration: usize, state: &IterationState)
    -> AdjustResult<ModelOutput>;
}

/// Durable record of each iteration's corrected state and diagnostic.
///
/// `store_state(i, _)` receives the initial condition for iteration `i`,
/// so iteration 0's state is stored before the first model run.
pub trait StateArchive {
    fn store_state(&mut self, iteration: usize, state: &IterationState) -> AdjustResult<()>;
    fn store_report(&mut self, report: &IterationReport) -> AdjustResult<()>;
}

/// Keeps every state and report in memory.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    pub states: Vec<(usize, IterationState)>,
    pub reports: Vec<IterationReport>,
}

impl StateArchive for MemoryArchive {
    fn store_state(&mut self, iteration: usize, state: &IterationState) -> AdjustResult<()> {
        self.states.push((iteration, state.clone()));
        Ok(())
    }

    fn store_report(&mut self, report: &IterationReport) -> AdjustResult<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Zero-based index of the iteration about to run.
    Iterating(usize),
    Done,
}

#[derive(Debug, Clone, Copy)]
pub struct EquilibratorConfig {
    pub iteration_count: usize,
    pub mode: CorrectionMode,
}

#[derive(Debug, Clone)]
pub struct AdjustOutcome {
    /// State after the last correction; the initial condition for the
    /// production run.
    pub state: IterationState,
    pub reports: Vec<IterationReport>,
}

pub struct Equilibrator {
    config: EquilibratorConfig,
    phase: Phase,
}

impl Equilibrator {
    pub fn new(config: EquilibratorConfig) -> Self {
        let phase = if config.iteration_count == 0 {
            Phase::Done
        } else {
            Phase::Iterating(0)
        };
        Self { config, phase }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &EquilibratorConfig {
        &self.config
    }

    /// Alternate model runs and corrections for `iteration_count` iterations.
    ///
    /// A model failure aborts the loop; iterations already stored in the
    /// archive stay there.
    pub fn run<M, A>(
        &mut self,
        initial: IterationState,
        model: &mut M,
        archive: &mut A,
    ) -> AdjustResult<AdjustOutcome>
    where
        M: ForwardModel + ?Sized,
        A: StateArchive + ?Sized,
    {
        initial.validate()?;
        let total = self.config.iteration_count;
        let mut state = initial;
        let mut reports = Vec::with_capacity(total);

        if let Phase::Iterating(0) = self.phase {
            archive.store_state(0, &state)?;
        }

        while let Phase::Iterating(iteration) = self.phase {
            info!(
                iteration = iteration + 1,
                total,
                mode = %self.config.mode,
                "ssh adjustment iteration"
            );

            let output = model.integrate(iteration, &state)?;
            let correction = apply_correction(&state, &output, self.config.mode)?;
            let max_delta = find_max_delta(iteration, &correction);
            match &max_delta {
                Some(d) => info!(
                    iteration = iteration + 1,
                    delta_ssh = d.delta_ssh,
                    cell = d.cell,
                    lon = d.lon_deg,
                    lat = d.lat_deg,
                    "max |deltaSSH|"
                ),
                None => warn!(
                    iteration = iteration + 1,
                    "no adjustable cell carries land-ice pressure; max |deltaSSH| not reported"
                ),
            }

            let report = IterationReport {
                iteration,
                corrected_cells: correction.corrected_cells,
                max_delta,
            };
            state = correction.state;
            archive.store_state(iteration + 1, &state)?;
            archive.store_report(&report)?;
            reports.push(report);

            self.phase = if iteration + 1 < total {
                Phase::Iterating(iteration + 1)
            } else {
                Phase::Done
            };
        }

        Ok(AdjustOutcome { state, reports })
    }
}

/// Convenience wrapper over [`Equilibrator::run`].
pub fn equilibrate<M, A>(
    config: EquilibratorConfig,
    initial: IterationState,
    model: &mut M,
    archive: &mut A,
) -> AdjustResult<AdjustOutcome>
where
    M: ForwardModel + ?Sized,
    A: StateArchive + ?Sized,
{
    Equilibrator::new(config).run(initial, model, archive)
}

impl<F> ForwardModel for F
where
    F: FnMut(usize, &IterationState) -> AdjustResult<ModelOutput>,
{
    fn integrate(
        &mut self,
        iteration: usize,
        state: &IterationState,
    ) -> AdjustResult<ModelOutput> {
        self(iteration, state)
    }
}

