//! Ice-shelf geometry preparation for the ISOMIP+ ocean domain.
//!
//! The raw benchmark geometry is cropped at a fixed x offset, padded with a
//! land buffer, scaled, calved where floating ice is too thin, and smoothed
//! with a coverage-weighted Gaussian filter so land values never leak across
//! the grounding line.

pub mod calving;
pub mod domain;
pub mod error;
pub mod processor;
pub mod smoother;

pub use calving::{CALVING_FLOATING_THRESHOLD, CalvingFields, apply_calving};
pub use domain::{Axis, BUFFER_CELLS, CROP_OFFSET_M, Domain};
pub use error::{GeometryError, GeometryResult};
pub use processor::{GeometryParams, ProcessedGeometry, RawGeometry, process_geometry};
pub use smoother::{
    COVERAGE_THRESHOLD, SmoothedGeometry, gaussian_filter, gaussian_kernel, smooth_geometry,
};
