//! Coverage-weighted Gaussian smoothing of bed and ice-draft topography.
//!
//! Bed and draft are weighted by the ocean fraction before blurring and the
//! result is divided by the blurred ocean fraction, a partial-cell treatment
//! that keeps land values out of the ocean near the grounding line. Where the
//! blurred coverage is at or below [`COVERAGE_THRESHOLD`] the weighted blur
//! is kept as is.

use nalgebra::DMatrix;

use crate::error::{GeometryError, GeometryResult};

/// Blurred ocean coverage must exceed this before a cell is normalized.
pub const COVERAGE_THRESHOLD: f64 = 0.01;

/// Kernel half-width in standard deviations.
const TRUNCATE: f64 = 4.0;

/// Below this the filter is the identity.
const MIN_SIGMA: f64 = 1e-15;

/// Normalized 1-D Gaussian weights of radius `⌊4σ + 0.5⌋`.
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as i64;
    let denom = -0.5 / (sigma * sigma);
    let mut weights: Vec<f64> = (-radius..=radius)
        .map(|x| (denom * (x * x) as f64).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}

/// Correlate every row (`along_rows = true`) or column with `weights`,
/// treating values outside the grid as zero.
fn correlate_axis(field: &DMatrix<f64>, weights: &[f64], along_rows: bool) -> DMatrix<f64> {
    let (ny, nx) = field.shape();
    let radius = (weights.len() / 2) as isize;
    let mut out = DMatrix::zeros(ny, nx);
    for row in 0..ny {
        for col in 0..nx {
            let mut acc = 0.0;
            for (k, w) in weights.iter().enumerate() {
                let offset = k as isize - radius;
                let (r, c) = if along_rows {
                    (row as isize, col as isize + offset)
                } else {
                    (row as isize + offset, col as isize)
                };
                if r < 0 || c < 0 || r >= ny as isize || c >= nx as isize {
                    continue;
                }
                acc += w * field[(r as usize, c as usize)];
            }
            out[(row, col)] = acc;
        }
    }
    out
}

/// Separable Gaussian blur with a zero-valued boundary.
pub fn gaussian_filter(field: &DMatrix<f64>, sigma: f64) -> DMatrix<f64> {
    if sigma <= MIN_SIGMA {
        return field.clone();
    }
    let weights = gaussian_kernel(sigma);
    let blurred = correlate_axis(field, &weights, false);
    correlate_axis(&blurred, &weights, true)
}

/// Output of [`smooth_geometry`].
#[derive(Debug, Clone)]
pub struct SmoothedGeometry {
    pub bed: DMatrix<f64>,
    pub draft: DMatrix<f64>,
    pub draft_mask: DMatrix<f64>,
}

/// Smooth bed, draft and floating fraction using only the ocean portion of
/// the grid.
pub fn smooth_geometry(
    land_fraction: &DMatrix<f64>,
    floating_fraction: &DMatrix<f64>,
    bed: &DMatrix<f64>,
    draft: &DMatrix<f64>,
    filter_sigma: f64,
) -> GeometryResult<SmoothedGeometry> {
    let shape = land_fraction.shape();
    for (name, m) in [
        ("floating fraction", floating_fraction),
        ("bed", bed),
        ("draft", draft),
    ] {
        if m.shape() != shape {
            return Err(GeometryError::Core(iso_core::IsoError::ShapeMismatch {
                what: name.to_string(),
                expected: shape,
                found: m.shape(),
            }));
        }
    }
    if !filter_sigma.is_finite() {
        return Err(GeometryError::InvalidParam {
            what: format!("filter_sigma must be finite, got {filter_sigma}"),
        });
    }

    let ocean_fraction = land_fraction.map(|l| 1.0 - l);
    let coverage = gaussian_filter(&ocean_fraction, filter_sigma);

    let normalize = |mut blurred: DMatrix<f64>| {
        for (v, c) in blurred.iter_mut().zip(coverage.iter()) {
            if *c > COVERAGE_THRESHOLD {
                *v /= c;
            }
        }
        blurred
    };

    let draft = normalize(gaussian_filter(
        &draft.component_mul(&ocean_fraction),
        filter_sigma,
    ));
    let bed = normalize(gaussian_filter(
        &bed.component_mul(&ocean_fraction),
        filter_sigma,
    ));
    let draft_mask = normalize(gaussian_filter(floating_fraction, filter_sigma));

    Ok(SmoothedGeometry {
        bed,
        draft,
        draft_mask,
    })
}
