//! Stage services: each is a blocking sequence of collaborator calls in
//! one work directory, recorded in the run ledger when it succeeds.

use std::fs;
use std::path::{Path, PathBuf};

use iso_adjust::{EquilibratorConfig, IterationReport, equilibrate};
use iso_forcing::build_forcing_series;
use iso_geometry::process_geometry;
use iso_io::iteration_file_name;
use iso_project::{Config, Stage, UnmatchedKey, update_namelist};
use iso_results::{RunLedger, StageManifest, StageSummary, compute_config_hash};
use tracing::info;

use crate::adjust::{FileArchive, FileModel};
use crate::collaborators::{
    CULLED_GRAPH_FILE, CULLED_MESH_FILE, Collaborators, GRAPH_FILE, MESH_FILE, ProcessRunner,
    run_model,
};
use crate::error::{AppError, AppResult};
use crate::progress::{Reporter, StageEvent, StageStep};
use crate::workdir::{FORCING_FILE, INIT_FILE, require};

/// Where a stage runs and which configuration it runs with.
#[derive(Debug, Clone)]
pub struct StageRequest {
    pub config_path: PathBuf,
    pub work_dir: PathBuf,
}

impl StageRequest {
    pub fn new(config_path: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            work_dir: work_dir.into(),
        }
    }
}

/// Read and validate a configuration file.
pub fn load_config(path: &Path) -> AppResult<Config> {
    let content = fs::read_to_string(path).map_err(|source| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(iso_project::from_yaml_str(&content)?)
}

struct StageRun<'p> {
    work_dir: PathBuf,
    config: Config,
    config_hash: String,
    ledger: RunLedger,
    reporter: Reporter<'p>,
}

impl<'p> StageRun<'p> {
    /// Validation happens here, before any collaborator is invoked.
    fn open(
        request: &StageRequest,
        stage: Stage,
        progress: Option<&'p mut dyn FnMut(StageEvent)>,
    ) -> AppResult<Self> {
        let mut reporter = Reporter::new(stage, progress);
        reporter.emit(StageStep::LoadingConfig, None);
        let config = load_config(&request.config_path)?;
        let ledger = RunLedger::for_work_dir(&request.work_dir)?;
        info!(stage = %stage, work_dir = %request.work_dir.display(), "stage started");
        Ok(Self {
            work_dir: request.work_dir.clone(),
            config_hash: compute_config_hash(&config),
            config,
            ledger,
            reporter,
        })
    }

    fn stage(&self) -> Stage {
        self.reporter.stage()
    }

    fn tools(&self) -> Collaborators<'_> {
        Collaborators::new(&self.config.execution, &self.work_dir)
    }

    fn update_namelist(&mut self) -> AppResult<()> {
        self.reporter.emit(StageStep::UpdatingNamelist, None);
        let path = self.work_dir.join(&self.config.execution.namelist);
        update_namelist(
            &path,
            self.config.stage_overrides(self.stage()),
            UnmatchedKey::Warn,
        )?;
        Ok(())
    }

    fn partition(&mut self, runner: &mut dyn ProcessRunner) -> AppResult<()> {
        self.reporter.emit(StageStep::Partitioning, None);
        runner.run(&self.tools().partition(self.stage()))
    }

    fn run_model(&mut self, runner: &mut dyn ProcessRunner) -> AppResult<()> {
        self.reporter.emit(StageStep::RunningModel, None);
        let stage = self.stage();
        run_model(runner, &self.tools(), stage)
    }

    fn manifest(&self) -> StageManifest {
        StageManifest::new(self.stage().as_str(), self.config_hash.clone())
    }

    fn finish(mut self, manifest: StageManifest) -> AppResult<StageManifest> {
        self.reporter.emit(StageStep::Recording, None);
        self.ledger.save_stage(&manifest)?;
        let elapsed = self.reporter.elapsed_s();
        info!(stage = %manifest.stage, elapsed_s = elapsed, "stage finished");
        self.reporter.emit(StageStep::Completed, None);
        Ok(manifest)
    }
}

/// Geometry → mesh conversion → partition → model → cull.
pub fn run_initial_state(
    request: &StageRequest,
    runner: &mut dyn ProcessRunner,
    progress: Option<&mut dyn FnMut(StageEvent)>,
) -> AppResult<StageManifest> {
    let mut run = StageRun::open(request, Stage::Init, progress)?;
    run.update_namelist()?;

    run.reporter.emit(StageStep::ProcessingGeometry, None);
    let geometry = process_geometry_in(&run.config, &run.work_dir)?;

    run.reporter.emit(StageStep::ConvertingMesh, None);
    runner.run(&run.tools().convert_mesh())?;
    require(&run.work_dir, GRAPH_FILE)?;

    run.partition(runner)?;
    run.run_model(runner)?;

    run.reporter.emit(StageStep::CullingMesh, None);
    runner.run(&run.tools().cull_cells())?;
    iso_io::set_global_attribute(&run.work_dir.join(CULLED_MESH_FILE), "is_periodic", "NO")?;

    let manifest = run
        .manifest()
        .with_artifact(&run.config.geometry.processed_geometry)
        .with_artifact(MESH_FILE)
        .with_artifact(GRAPH_FILE)
        .with_artifact(INIT_FILE)
        .with_artifact(CULLED_MESH_FILE)
        .with_artifact(CULLED_GRAPH_FILE)
        .with_summary(geometry);
    run.finish(manifest)
}

/// Iterate the initial state towards the model's own steady response.
///
/// `init0.nc` is taken from `init.nc` the first time; afterwards `init.nc`
/// points at the latest `init{i}.nc`.
pub fn run_ssh_adjustment(
    request: &StageRequest,
    runner: &mut dyn ProcessRunner,
    progress: Option<&mut dyn FnMut(StageEvent)>,
) -> AppResult<StageManifest> {
    let mut run = StageRun::open(request, Stage::SshAdjustment, progress)?;
    let config = EquilibratorConfig {
        iteration_count: run.config.ssh_adjustment.iteration_count,
        mode: run.config.correction_mode()?,
    };
    run.update_namelist()?;
    run.partition(runner)?;

    let first = run.work_dir.join(iteration_file_name(0));
    if !first.exists() {
        require(&run.work_dir, INIT_FILE)?;
        fs::copy(run.work_dir.join(INIT_FILE), &first)?;
    }
    let initial = iso_io::read_iteration_state(&first)?;
    run.ledger.reset_iterations()?;

    let tools = Collaborators::new(&run.config.execution, &run.work_dir);
    let mut model = FileModel::new(
        runner,
        tools,
        &run.work_dir,
        &mut run.reporter,
        config.iteration_count,
    );
    let mut archive = FileArchive::new(&run.work_dir, &run.ledger);

    let outcome = match equilibrate(config, initial, &mut model, &mut archive) {
        Ok(outcome) => outcome,
        Err(e) => {
            return Err(model
                .take_failure()
                .or_else(|| archive.take_failure())
                .unwrap_or_else(|| e.into()));
        }
    };

    let last = iteration_file_name(config.iteration_count);
    let final_max = outcome
        .reports
        .last()
        .and_then(|r: &IterationReport| r.max_delta.as_ref())
        .map(|d| d.delta_ssh);
    let manifest = run
        .manifest()
        .with_artifact(last)
        .with_artifact(INIT_FILE)
        .with_summary(StageSummary::SshAdjustment {
            iterations: outcome.reports.len(),
            mode: config.mode.to_string(),
            final_max_delta_ssh: final_max,
        });
    run.finish(manifest)
}

/// Forcing (unless present) → namelist with cycle length → partition → model.
pub fn run_simulation(
    request: &StageRequest,
    runner: &mut dyn ProcessRunner,
    progress: Option<&mut dyn FnMut(StageEvent)>,
) -> AppResult<StageManifest> {
    let mut run = StageRun::open(request, Stage::Simulation, progress)?;
    let mut manifest = run.manifest();

    if run.work_dir.join(FORCING_FILE).exists() {
        info!(file = FORCING_FILE, "forcing file present; reusing it");
    } else {
        run.reporter.emit(StageStep::BuildingForcing, None);
        let summary = build_forcing_in(&run.config, &run.work_dir)?;
        manifest = manifest.with_summary(summary);
    }

    run.update_namelist()?;
    run.partition(runner)?;
    run.run_model(runner)?;
    run.finish(manifest.with_artifact(FORCING_FILE))
}

/// Partition and run with the `test` core count; the namelist is left alone.
pub fn run_test(
    request: &StageRequest,
    runner: &mut dyn ProcessRunner,
    progress: Option<&mut dyn FnMut(StageEvent)>,
) -> AppResult<StageManifest> {
    let mut run = StageRun::open(request, Stage::Test, progress)?;
    run.partition(runner)?;
    run.run_model(runner)?;
    let manifest = run.manifest();
    run.finish(manifest)
}

/// Process the input geometry on its own.
pub fn process_geometry_file(request: &StageRequest) -> AppResult<StageSummary> {
    let config = load_config(&request.config_path)?;
    process_geometry_in(&config, &request.work_dir)
}

/// Build the forcing file on its own, replacing any existing one.
pub fn build_forcing_file(request: &StageRequest) -> AppResult<StageSummary> {
    let config = load_config(&request.config_path)?;
    build_forcing_in(&config, &request.work_dir)
}

fn process_geometry_in(config: &Config, work_dir: &Path) -> AppResult<StageSummary> {
    let params = config.geometry_params()?;
    let raw = iso_io::read_raw_geometry(&work_dir.join(&config.geometry.input_geometry))?;
    let processed = process_geometry(&raw, &params)?;
    iso_io::write_processed_geometry(&work_dir.join(&config.geometry.processed_geometry), &processed)?;
    Ok(StageSummary::Geometry {
        nx: processed.x.len(),
        ny: processed.y.len(),
        calved_cells: processed.calved_cells,
    })
}

fn build_forcing_in(config: &Config, work_dir: &Path) -> AppResult<StageSummary> {
    let schedule = config.schedule()?;
    require(work_dir, INIT_FILE)?;
    let reference = iso_io::read_reference_land_ice(&work_dir.join(INIT_FILE))?;
    let series = build_forcing_series(&reference, &schedule)?;
    iso_io::write_forcing_series(&work_dir.join(FORCING_FILE), &series)?;
    Ok(StageSummary::Forcing {
        n_time: series.n_time(),
        n_cells: series.n_cells(),
    })
}

/// Recorded stages and the adjustment history of a work directory.
#[derive(Debug, Clone)]
pub struct RunStatus {
    pub ledger_dir: PathBuf,
    pub stages: Vec<StageManifest>,
    pub iterations: Vec<IterationReport>,
}

pub fn status(work_dir: &Path) -> AppResult<RunStatus> {
    let ledger = RunLedger::for_work_dir(work_dir)?;
    Ok(RunStatus {
        ledger_dir: ledger.root_dir().to_path_buf(),
        stages: ledger.list_stages()?,
        iterations: ledger.load_iterations()?,
    })
}
