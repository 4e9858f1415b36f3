use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use iso_app::{
    AppError, AppResult, ProcessRunner, StageEvent, StageRequest, StageStep, ToolCommand,
    run_simulation, run_ssh_adjustment, run_test, status,
};

/// Records every command; optionally fails the n-th one.
#[derive(Default)]
struct RecordingRunner {
    calls: Vec<ToolCommand>,
    fail_at: Option<usize>,
}

impl ProcessRunner for RecordingRunner {
    fn run(&mut self, command: &ToolCommand) -> AppResult<()> {
        let index = self.calls.len();
        self.calls.push(command.clone());
        if self.fail_at == Some(index) {
            return Err(AppError::Collaborator {
                program: command.program.clone(),
                status: "exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}

const NAMELIST: &str = "&io
    config_pio_num_iotasks = 0
    config_pio_stride = 1
/
&time_varying_forcing
    config_time_varying_land_ice_forcing_cycle_duration = '0002-00-00_00:00:00'
/
&time_management
    config_run_duration = '0000_01:00:00'
/
";

fn config_yaml(mode: &str) -> String {
    format!(
        "execution:
  parallel_executable: mpirun
  omp_threads: 3
  ssh_adjustment:
    cores: 8
    pio_tasks: 2
  simulation:
    cores: 12
    pio_tasks: 3
  test:
    cores: 4
    pio_tasks: 1
forcing:
  scaling: \"1.0, 0.9, 0.8\"
ssh_adjustment:
  iteration_count: 2
  variable_to_modify: {mode}
namelist:
  config_run_duration: \"'0001-00-00_00:00:00'\"
"
    )
}

fn case_dir(label: &str, mode: &str) -> StageRequest {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("iso_stage_{label}_{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("namelist.ocean"), NAMELIST).unwrap();
    let config_path: PathBuf = dir.join("ocean0.yaml");
    fs::write(&config_path, config_yaml(mode)).unwrap();
    StageRequest::new(config_path, dir)
}

#[test]
fn invalid_mode_fails_before_any_model_run() {
    let request = case_dir("invalid", "invalid");
    let mut runner = RecordingRunner::default();
    let err = run_ssh_adjustment(&request, &mut runner, None).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
    assert!(format!("{err}").contains("invalid"));
    assert!(runner.calls.is_empty());
    fs::remove_dir_all(&request.work_dir).ok();
}

#[test]
fn test_run_partitions_then_runs_model_without_touching_namelist() {
    let request = case_dir("test", "ssh");
    let mut runner = RecordingRunner::default();
    let mut steps = Vec::new();
    let mut on_event = |e: StageEvent| steps.push(e.step);

    let manifest = run_test(&request, &mut runner, Some(&mut on_event)).unwrap();

    assert_eq!(manifest.stage, "test");
    assert_eq!(runner.calls.len(), 2);
    assert_eq!(runner.calls[0].command_line(), "gpmetis graph.info 4");
    assert_eq!(
        runner.calls[1].command_line(),
        "mpirun -n 4 ./ocean_model -n namelist.ocean -s streams.ocean"
    );
    assert_eq!(
        runner.calls[1].env,
        vec![("OMP_NUM_THREADS".to_string(), "3".to_string())]
    );
    assert_eq!(runner.calls[1].cwd, request.work_dir);
    assert_eq!(
        fs::read_to_string(request.work_dir.join("namelist.ocean")).unwrap(),
        NAMELIST
    );
    assert_eq!(steps.first(), Some(&StageStep::LoadingConfig));
    assert_eq!(steps.last(), Some(&StageStep::Completed));

    let recorded = status(&request.work_dir).unwrap();
    assert_eq!(recorded.ledger_dir, request.work_dir.join(".isomip"));
    assert_eq!(recorded.stages.len(), 1);
    assert_eq!(recorded.stages[0].config_hash, manifest.config_hash);
    fs::remove_dir_all(&request.work_dir).ok();
}

#[test]
fn failing_partitioner_stops_the_stage() {
    let request = case_dir("fail", "ssh");
    let mut runner = RecordingRunner {
        fail_at: Some(0),
        ..Default::default()
    };
    let err = run_test(&request, &mut runner, None).unwrap_err();
    assert!(matches!(err, AppError::Collaborator { ref program, .. } if program == "gpmetis"));
    assert_eq!(runner.calls.len(), 1);
    assert!(status(&request.work_dir).unwrap().stages.is_empty());
    fs::remove_dir_all(&request.work_dir).ok();
}

#[test]
fn simulation_reuses_forcing_and_sets_cycle_length() {
    let request = case_dir("sim", "landIcePressure");
    fs::write(request.work_dir.join("land_ice_forcing.nc"), b"existing").unwrap();
    let mut runner = RecordingRunner::default();

    run_simulation(&request, &mut runner, None).unwrap();

    let namelist = fs::read_to_string(request.work_dir.join("namelist.ocean")).unwrap();
    assert!(namelist.contains("config_pio_num_iotasks = 3"));
    assert!(namelist.contains("config_pio_stride = 4"));
    assert!(namelist.contains(
        "config_time_varying_land_ice_forcing_cycle_duration = '0003-00-00_00:00:00'"
    ));
    assert!(namelist.contains("config_run_duration = '0001-00-00_00:00:00'"));
    assert_eq!(
        fs::read(request.work_dir.join("land_ice_forcing.nc")).unwrap(),
        b"existing"
    );
    assert_eq!(runner.calls.len(), 2);
    assert!(runner.calls[1].command_line().starts_with("mpirun -n 12 "));
    fs::remove_dir_all(&request.work_dir).ok();
}

#[test]
fn ssh_adjustment_without_initial_state_is_missing_input() {
    let request = case_dir("noinit", "ssh");
    let mut runner = RecordingRunner::default();
    let err = run_ssh_adjustment(&request, &mut runner, None).unwrap_err();
    assert!(matches!(err, AppError::MissingInput { .. }));
    // only the partitioner ran
    assert_eq!(runner.calls.len(), 1);
    fs::remove_dir_all(&request.work_dir).ok();
}
