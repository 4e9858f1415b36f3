//! Initial-state fields threaded through the adjustment loop.

use nalgebra::DMatrix;

use crate::error::{AdjustError, AdjustResult};

/// The initial condition for one adjustment iteration.
///
/// Per-cell vectors have length `nCells`; `layer_thickness` is
/// `(nCells, nVertLevels)`.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationState {
    pub ssh: Vec<f64>,
    pub bottom_depth: Vec<f64>,
    pub modify_ssh_mask: Vec<i32>,
    pub land_ice_pressure: Vec<f64>,
    pub land_ice_draft: Vec<f64>,
    pub layer_thickness: DMatrix<f64>,
    /// Radians
    pub lon_cell: Vec<f64>,
    /// Radians
    pub lat_cell: Vec<f64>,
    pub max_level_cell: Vec<i32>,
}

impl IterationState {
    pub fn n_cells(&self) -> usize {
        self.ssh.len()
    }

    pub fn n_vert_levels(&self) -> usize {
        self.layer_thickness.ncols()
    }

    /// Cell takes part in the correction: flagged by the modify mask and wet.
    #[inline]
    pub fn is_adjustable(&self, cell: usize) -> bool {
        self.modify_ssh_mask[cell] == 1 && self.max_level_cell[cell] > 0
    }

    /// Number of active levels in a column, capped at `nVertLevels`.
    #[inline]
    pub fn active_levels(&self, cell: usize) -> usize {
        (self.max_level_cell[cell].max(0) as usize).min(self.n_vert_levels())
    }

    pub fn adjustable_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_cells()).filter(move |&c| self.is_adjustable(c))
    }

    pub fn validate(&self) -> AdjustResult<()> {
        let expected = self.n_cells();
        let lengths: [(&'static str, usize); 8] = [
            ("bottomDepth", self.bottom_depth.len()),
            ("modifySSHMask", self.modify_ssh_mask.len()),
            ("landIcePressure", self.land_ice_pressure.len()),
            ("landIceDraft", self.land_ice_draft.len()),
            ("layerThickness", self.layer_thickness.nrows()),
            ("lonCell", self.lon_cell.len()),
            ("latCell", self.lat_cell.len()),
            ("maxLevelCell", self.max_level_cell.len()),
        ];
        for (name, found) in lengths {
            if found != expected {
                return Err(AdjustError::CellCount {
                    name,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

/// Fields read back from the forward model's output at its final time.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub final_ssh: Vec<f64>,
    /// Density of the top layer (kg m⁻³).
    pub top_density: Vec<f64>,
}

impl ModelOutput {
    pub fn check_against(&self, state: &IterationState) -> AdjustResult<()> {
        let expected = state.n_cells();
        for (name, found) in [
            ("ssh", self.final_ssh.len()),
            ("density", self.top_density.len()),
        ] {
            if found != expected {
                return Err(AdjustError::CellCount {
                    name,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::four_cells;

    #[test]
    fn adjustable_requires_mask_and_wet_column() {
        let s = four_cells();
        assert_eq!(s.adjustable_cells().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(s.active_levels(3), 2);
        assert_eq!(s.active_levels(2), 0);
    }

    #[test]
    fn validate_catches_short_fields() {
        let mut s = four_cells();
        assert!(s.validate().is_ok());
        s.lat_cell.pop();
        assert!(s.validate().is_err());
    }
}
