//! Expansion of a reference land-ice state into a forcing series.

use nalgebra::DMatrix;
use tracing::info;

use crate::error::{ForcingError, ForcingResult};
use crate::schedule::ScalingSchedule;
use crate::xtime::year_timestamp;

/// Reference land-ice fields, one value per cell.
#[derive(Debug, Clone)]
pub struct ReferenceLandIce {
    pub draft: Vec<f64>,
    pub pressure: Vec<f64>,
    pub fraction: Vec<f64>,
}

impl ReferenceLandIce {
    pub fn n_cells(&self) -> usize {
        self.draft.len()
    }

    fn check(&self) -> ForcingResult<()> {
        let expected = self.n_cells();
        for (name, field) in [("landIcePressure", &self.pressure), ("landIceFraction", &self.fraction)] {
            if field.len() != expected {
                return Err(ForcingError::CellCount {
                    name,
                    expected,
                    found: field.len(),
                });
            }
        }
        Ok(())
    }
}

/// Time-indexed forcing; matrices are `(nTime, nCells)`.
#[derive(Debug, Clone)]
pub struct ForcingSeries {
    pub xtime: Vec<String>,
    pub draft: DMatrix<f64>,
    pub pressure: DMatrix<f64>,
    pub fraction: DMatrix<f64>,
}

impl ForcingSeries {
    pub fn n_time(&self) -> usize {
        self.xtime.len()
    }

    pub fn n_cells(&self) -> usize {
        self.draft.ncols()
    }
}

/// Scale draft and pressure by the normalized schedule; hold fraction fixed.
pub fn build_forcing_series(
    reference: &ReferenceLandIce,
    schedule: &ScalingSchedule,
) -> ForcingResult<ForcingSeries> {
    reference.check()?;

    let n_time = schedule.len();
    let n_cells = reference.n_cells();
    let scales = schedule.normalized();

    let xtime = schedule
        .years()
        .iter()
        .map(|&y| year_timestamp(y))
        .collect::<ForcingResult<Vec<_>>>()?;

    let draft = DMatrix::from_fn(n_time, n_cells, |t, c| scales[t] * reference.draft[c]);
    let pressure = DMatrix::from_fn(n_time, n_cells, |t, c| scales[t] * reference.pressure[c]);
    let fraction = DMatrix::from_fn(n_time, n_cells, |_, c| reference.fraction[c]);

    info!(n_time, n_cells, scales = ?scales, "built land-ice forcing series");

    Ok(ForcingSeries {
        xtime,
        draft,
        pressure,
        fraction,
    })
}
