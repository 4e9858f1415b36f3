use std::path::Path;

use iso_adjust::CorrectionMode;
use iso_project::{ProjectError, Stage, ValidationError, from_yaml_str, load_yaml};

const MINIMAL: &str = r#"
execution:
  parallel_executable: mpirun
  simulation:
    cores: 8
    pio_tasks: 2
forcing:
  scaling: [0.5, 1.0, 1.5]
ssh_adjustment:
  iteration_count: 3
  variable_to_modify: ssh
"#;

#[test]
fn sample_config_loads_and_validates() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs/ocean0.yaml");
    let config = load_yaml(&path).unwrap_or_else(|e| panic!("failed to load sample: {e}"));

    assert_eq!(config.forcing.scaling, vec![1.0, 0.9, 0.8, 0.9, 1.0]);
    assert_eq!(config.forcing.resolved_years(), vec![1, 2, 3, 4, 5]);
    assert_eq!(
        config.correction_mode().unwrap(),
        CorrectionMode::LandIcePressure
    );
    assert_eq!(config.execution.model_executable, "./ocean_model");
    assert_eq!(config.execution.resources(Stage::Simulation).pio_stride(), 9);
}

#[test]
fn defaults_fill_unspecified_sections() {
    let config = from_yaml_str(MINIMAL).unwrap();
    assert_eq!(config.geometry.filter_sigma, 2.0);
    assert_eq!(config.geometry.min_ice_thickness, 100.0);
    assert_eq!(config.execution.partitioner, "gpmetis");
    assert_eq!(config.execution.init.cores, 1);
    assert!(config.namelist.is_empty());
    assert_eq!(config.geometry_params().unwrap().scale, 0.5);
}

#[test]
fn simulation_overrides_carry_pio_and_cycle_length() {
    let config = from_yaml_str(MINIMAL).unwrap();
    let overrides = config.stage_overrides(Stage::Simulation);
    assert!(overrides.contains(&("config_pio_num_iotasks", "2".to_string())));
    assert!(overrides.contains(&("config_pio_stride", "4".to_string())));
    assert!(overrides.contains(&(
        "config_time_varying_land_ice_forcing_cycle_duration",
        "'0003-00-00_00:00:00'".to_string()
    )));

    let init = config.stage_overrides(Stage::Init);
    assert!(
        !init
            .iter()
            .any(|(k, _)| *k == "config_time_varying_land_ice_forcing_cycle_duration")
    );
}

fn rejects(yaml: &str) -> ValidationError {
    match from_yaml_str(yaml) {
        Err(ProjectError::Validation(e)) => e,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn unknown_variable_to_modify_is_rejected() {
    let err = rejects(&MINIMAL.replace("variable_to_modify: ssh", "variable_to_modify: invalid"));
    assert!(err.to_string().contains("variable_to_modify"));
}

#[test]
fn zero_first_scale_is_rejected() {
    rejects(&MINIMAL.replace("[0.5, 1.0, 1.5]", "\"0.0, 1.0\""));
}

#[test]
fn years_must_start_at_one_and_match_scaling() {
    rejects(&MINIMAL.replace("scaling: [0.5, 1.0, 1.5]", "scaling: [0.5, 1.0, 1.5]\n  years: [2, 3, 4]"));
    rejects(&MINIMAL.replace("scaling: [0.5, 1.0, 1.5]", "scaling: [0.5, 1.0, 1.5]\n  years: \"1, 2\""));
    rejects(&MINIMAL.replace("scaling: [0.5, 1.0, 1.5]", "scaling: [0.5, 1.0, 1.5]\n  years: [1, 3, 4]"));
}

#[test]
fn pio_tasks_cannot_exceed_cores() {
    rejects(&MINIMAL.replace("pio_tasks: 2", "pio_tasks: 16"));
}

#[test]
fn zero_iterations_are_rejected() {
    rejects(&MINIMAL.replace("iteration_count: 3", "iteration_count: 0"));
}

#[test]
fn malformed_scaling_string_is_a_yaml_error() {
    let yaml = MINIMAL.replace("[0.5, 1.0, 1.5]", "\"0.5, half\"");
    assert!(matches!(from_yaml_str(&yaml), Err(ProjectError::Yaml(_))));
}

#[test]
fn bare_number_is_a_one_year_schedule() {
    let yaml = MINIMAL.replace("scaling: [0.5, 1.0, 1.5]", "scaling: 1.0\n  years: 1");
    let config = from_yaml_str(&yaml).unwrap();
    assert_eq!(config.forcing.scaling, vec![1.0]);
    assert_eq!(config.forcing.years, Some(vec![1]));
    assert_eq!(config.schedule().unwrap().len(), 1);

    let config = from_yaml_str(&MINIMAL.replace("[0.5, 1.0, 1.5]", "2")).unwrap();
    assert_eq!(config.forcing.scaling, vec![2.0]);
    assert_eq!(config.forcing.resolved_years(), vec![1]);
}
