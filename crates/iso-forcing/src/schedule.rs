//! Per-year scale factors for the land-ice forcing.

use crate::error::{ForcingError, ForcingResult};

/// Ordered `(year, scale)` pairs. Years run 1, 2, 3, ... without gaps and
/// the first scale factor is the normalization reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingSchedule {
    years: Vec<u32>,
    scaling: Vec<f64>,
}

impl ScalingSchedule {
    pub fn new(years: Vec<u32>, scaling: Vec<f64>) -> ForcingResult<Self> {
        if scaling.is_empty() {
            return Err(ForcingError::EmptySchedule);
        }
        if years.len() != scaling.len() {
            return Err(ForcingError::LengthMismatch {
                years: years.len(),
                scales: scaling.len(),
            });
        }
        if years[0] != 1 {
            return Err(ForcingError::FirstYear { first: years[0] });
        }
        for (index, pair) in years.windows(2).enumerate() {
            if pair[1] != pair[0] + 1 {
                return Err(ForcingError::YearGap {
                    index: index + 1,
                    year: pair[1],
                });
            }
        }
        let reference = scaling[0];
        if reference == 0.0 || !reference.is_finite() {
            return Err(ForcingError::ZeroReferenceScale { value: reference });
        }
        Ok(Self { years, scaling })
    }

    /// One entry per scale factor, years `1..=n`.
    pub fn from_scaling(scaling: Vec<f64>) -> ForcingResult<Self> {
        let years = (1..=scaling.len() as u32).collect();
        Self::new(years, scaling)
    }

    pub fn years(&self) -> &[u32] {
        &self.years
    }

    pub fn scaling(&self) -> &[f64] {
        &self.scaling
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Scale used for the initial geometry (the unnormalized first entry).
    pub fn reference_scale(&self) -> f64 {
        self.scaling[0]
    }

    /// Scale factors divided by the first one.
    pub fn normalized(&self) -> Vec<f64> {
        let reference = self.reference_scale();
        self.scaling.iter().map(|s| s / reference).collect()
    }

    /// Length of one forcing cycle in the model's duration format.
    pub fn cycle_duration(&self) -> String {
        format!("{:04}-00-00_00:00:00", self.len())
    }
}
