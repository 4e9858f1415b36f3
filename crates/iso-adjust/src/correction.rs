//! Correction of SSH or land-ice pressure from a forward-model response.

use iso_core::{hydrostatic_pressure, kg_per_m3, m, to_pa};

use crate::error::{AdjustError, AdjustResult};
use crate::mode::CorrectionMode;
use crate::state::{IterationState, ModelOutput};

/// Result of one correction step.
#[derive(Debug, Clone)]
pub struct Correction {
    /// The next iteration's state.
    pub state: IterationState,
    /// `mask · (finalSSH − initialSSH)`; zero outside adjustable cells.
    pub delta_ssh: Vec<f64>,
    /// Number of cells that were corrected.
    pub corrected_cells: usize,
}

/// Build the next iteration's state from `state` and the model's response.
pub fn apply_correction(
    state: &IterationState,
    output: &ModelOutput,
    mode: CorrectionMode,
) -> AdjustResult<Correction> {
    state.validate()?;
    output.check_against(state)?;

    let mut delta_ssh = vec![0.0; state.n_cells()];
    let mut corrected_cells = 0;
    for cell in state.adjustable_cells() {
        delta_ssh[cell] = output.final_ssh[cell] - state.ssh[cell];
        corrected_cells += 1;
    }

    let next = match mode {
        CorrectionMode::Ssh => correct_ssh(state, output)?,
        CorrectionMode::LandIcePressure => correct_pressure(state, output, &delta_ssh),
    };

    Ok(Correction {
        state: next,
        delta_ssh,
        corrected_cells,
    })
}

/// Move the free surface to the model's final SSH and stretch the active
/// layers so the column still reaches the same bottom depth.
fn correct_ssh(state: &IterationState, output: &ModelOutput) -> AdjustResult<IterationState> {
    let mut next = state.clone();
    for cell in state.adjustable_cells() {
        let new_ssh = output.final_ssh[cell];
        let old_depth = state.ssh[cell] + state.bottom_depth[cell];
        let new_depth = new_ssh + state.bottom_depth[cell];
        if old_depth <= 0.0 || new_depth < 0.0 || !new_depth.is_finite() {
            return Err(AdjustError::NonPhysicalColumn {
                cell,
                old_depth,
                new_depth,
            });
        }
        let stretch = new_depth / old_depth;
        for k in 0..state.active_levels(cell) {
            next.layer_thickness[(cell, k)] *= stretch;
        }
        next.ssh[cell] = new_ssh;
        // Draft and SSH coincide under the ice shelf; the model uses the
        // draft when compensating sea-surface tilt.
        next.land_ice_draft[cell] = new_ssh;
    }
    Ok(next)
}

/// Raising SSH by Δ means the ice was pushing too little: add ρ g Δ to the
/// land-ice pressure and clamp at zero.
fn correct_pressure(
    state: &IterationState,
    output: &ModelOutput,
    delta_ssh: &[f64],
) -> IterationState {
    let mut next = state.clone();
    for cell in state.adjustable_cells() {
        let dp = hydrostatic_pressure(kg_per_m3(output.top_density[cell]), m(delta_ssh[cell]));
        next.land_ice_pressure[cell] = (state.land_ice_pressure[cell] + to_pa(dp)).max(0.0);
    }
    next
}
