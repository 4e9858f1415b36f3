//! Adjustment loop driven by stub forward models.

use iso_adjust::{
    AdjustError, AdjustResult, CorrectionMode, Equilibrator, EquilibratorConfig, IterationState,
    MemoryArchive, ModelOutput, Phase, apply_correction, equilibrate,
};
use iso_core::constants::GRAVITY_MPS2;
use nalgebra::DMatrix;
use proptest::prelude::*;

fn column_state(n: usize) -> IterationState {
    IterationState {
        ssh: vec![-100.0; n],
        bottom_depth: vec![1000.0; n],
        modify_ssh_mask: vec![1; n],
        land_ice_pressure: vec![1.0e6; n],
        land_ice_draft: vec![-100.0; n],
        layer_thickness: DMatrix::from_element(n, 3, 300.0),
        lon_cell: vec![0.0; n],
        lat_cell: vec![0.0; n],
        max_level_cell: vec![3; n],
    }
}

/// Model whose SSH always rises 0.1 m above the initial condition.
fn rising(_iteration: usize, state: &IterationState) -> AdjustResult<ModelOutput> {
    Ok(ModelOutput {
        final_ssh: state.ssh.iter().map(|s| s + 0.1).collect(),
        top_density: vec![1027.0; state.n_cells()],
    })
}

#[test]
fn three_ssh_iterations_accumulate_rise() {
    let mut archive = MemoryArchive::default();
    let mut model = rising;
    let outcome = equilibrate(
        EquilibratorConfig {
            iteration_count: 3,
            mode: CorrectionMode::Ssh,
        },
        column_state(2),
        &mut model,
        &mut archive,
    )
    .expect("adjustment should succeed");

    for s in &outcome.state.ssh {
        assert!((s - (-100.0 + 0.3)).abs() < 1e-9);
    }
    let column: f64 = (0..3).map(|k| outcome.state.layer_thickness[(0, k)]).sum();
    assert!((column - (outcome.state.ssh[0] + 1000.0)).abs() < 1e-9);

    assert_eq!(outcome.reports.len(), 3);
    for (i, r) in outcome.reports.iter().enumerate() {
        assert_eq!(r.iteration, i);
        let d = r.max_delta.as_ref().expect("ice-covered cells exist");
        assert!((d.delta_ssh - 0.1).abs() < 1e-9);
    }
    let stored: Vec<usize> = archive.states.iter().map(|(i, _)| *i).collect();
    assert_eq!(stored, vec![0, 1, 2, 3]);
    assert_eq!(archive.reports.len(), 3);
}

#[test]
fn pressure_mode_keeps_ssh_and_raises_pressure() {
    let mut archive = MemoryArchive::default();
    let mut model = rising;
    let outcome = equilibrate(
        EquilibratorConfig {
            iteration_count: 2,
            mode: CorrectionMode::LandIcePressure,
        },
        column_state(1),
        &mut model,
        &mut archive,
    )
    .unwrap();

    assert_eq!(outcome.state.ssh, vec![-100.0]);
    let expected = 1.0e6 + 2.0 * 1027.0 * GRAVITY_MPS2 * 0.1;
    assert!((outcome.state.land_ice_pressure[0] - expected).abs() < 1e-6);
    let d = outcome.reports[1].max_delta.as_ref().unwrap();
    assert_eq!(d.ssh, -100.0);
}

#[test]
fn model_failure_aborts_remaining_iterations() {
    let mut archive = MemoryArchive::default();
    let mut calls = 0;
    let mut model = |iteration: usize, state: &IterationState| {
        calls += 1;
        if iteration == 1 {
            Err(AdjustError::Model {
                iteration,
                message: "exit status 1".into(),
            })
        } else {
            rising(iteration, state)
        }
    };
    let mut eq = Equilibrator::new(EquilibratorConfig {
        iteration_count: 5,
        mode: CorrectionMode::Ssh,
    });
    let err = eq
        .run(column_state(1), &mut model, &mut archive)
        .unwrap_err();

    assert!(matches!(err, AdjustError::Model { iteration: 1, .. }));
    assert_eq!(calls, 2);
    assert_eq!(eq.phase(), Phase::Iterating(1));
    assert_eq!(archive.states.len(), 2);
    assert_eq!(archive.reports.len(), 1);
}

#[test]
fn zero_iterations_returns_initial_state() {
    let mut archive = MemoryArchive::default();
    let mut model = |_: usize, _: &IterationState| -> AdjustResult<ModelOutput> {
        panic!("model must not run")
    };
    let initial = column_state(2);
    let outcome = equilibrate(
        EquilibratorConfig {
            iteration_count: 0,
            mode: CorrectionMode::Ssh,
        },
        initial.clone(),
        &mut model,
        &mut archive,
    )
    .unwrap();
    assert_eq!(outcome.state, initial);
    assert!(outcome.reports.is_empty());
    assert!(archive.states.is_empty());
}

#[test]
fn unknown_mode_name_is_rejected() {
    let err = "invalid".parse::<CorrectionMode>().unwrap_err();
    assert!(matches!(err, AdjustError::UnsupportedMode { .. }));
}

fn single_column(
    ssh: f64,
    bottom: f64,
    layers: Vec<f64>,
    max_level: i32,
    pressure: f64,
) -> IterationState {
    let n = layers.len();
    IterationState {
        ssh: vec![ssh],
        bottom_depth: vec![bottom],
        modify_ssh_mask: vec![1],
        land_ice_pressure: vec![pressure],
        land_ice_draft: vec![ssh],
        layer_thickness: DMatrix::from_row_slice(1, n, &layers),
        lon_cell: vec![0.0],
        lat_cell: vec![0.0],
        max_level_cell: vec![max_level],
    }
}

proptest! {
    #[test]
    fn ssh_stretch_matches_depth_ratio(
        bottom in 10.0f64..2000.0,
        ssh_frac in 0.0f64..0.9,
        new_frac in 0.0f64..0.9,
        layers in prop::collection::vec(0.0f64..500.0, 1..6),
        max_level in 1i32..8,
    ) {
        let ssh = -ssh_frac * bottom;
        let new_ssh = -new_frac * bottom;
        let state = single_column(ssh, bottom, layers.clone(), max_level, 1.0e5);
        let out = ModelOutput { final_ssh: vec![new_ssh], top_density: vec![1027.0] };
        let c = apply_correction(&state, &out, CorrectionMode::Ssh).unwrap();

        let stretch = (new_ssh + bottom) / (ssh + bottom);
        let active = (max_level as usize).min(layers.len());
        for (k, h) in layers.iter().enumerate() {
            let got = c.state.layer_thickness[(0, k)];
            prop_assert!(got >= 0.0);
            if k < active {
                prop_assert_eq!(got, h * stretch);
            } else {
                prop_assert_eq!(got, *h);
            }
        }
        prop_assert_eq!(c.state.ssh[0], new_ssh);
        prop_assert_eq!(c.state.land_ice_draft[0], new_ssh);
    }

    #[test]
    fn pressure_update_is_clamped_hydrostatic_increment(
        pressure in 0.0f64..5.0e6,
        delta in -50.0f64..50.0,
        rho in 1000.0f64..1040.0,
    ) {
        let state = single_column(-100.0, 1000.0, vec![300.0, 300.0, 300.0], 3, pressure);
        let out = ModelOutput { final_ssh: vec![-100.0 + delta], top_density: vec![rho] };
        let c = apply_correction(&state, &out, CorrectionMode::LandIcePressure).unwrap();

        let got_delta = c.delta_ssh[0];
        let expected = (pressure + rho * GRAVITY_MPS2 * got_delta).max(0.0);
        let got = c.state.land_ice_pressure[0];
        prop_assert!(got >= 0.0);
        prop_assert!((got - expected).abs() <= 1e-12 * expected.abs().max(1.0) * 10.0);
        prop_assert_eq!(&c.state.ssh, &state.ssh);
    }

    #[test]
    fn masked_cells_are_untouched(
        final_ssh in -50.0f64..0.0,
        mask in 0i32..2,
        max_level in 0i32..3,
    ) {
        let mut state = single_column(-10.0, 500.0, vec![100.0, 200.0, 190.0], max_level, 2.0e5);
        state.modify_ssh_mask = vec![mask];
        let out = ModelOutput { final_ssh: vec![final_ssh], top_density: vec![1027.0] };
        for mode in [CorrectionMode::Ssh, CorrectionMode::LandIcePressure] {
            let c = apply_correction(&state, &out, mode).unwrap();
            if mask == 0 || max_level == 0 {
                prop_assert_eq!(&c.state, &state);
                prop_assert_eq!(c.delta_ssh[0], 0.0);
            }
        }
    }
}
