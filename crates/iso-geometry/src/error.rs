//! Error types for geometry processing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Crop offset {offset} m lies outside the x axis (max {max} m)")]
    OffsetOutOfRange { offset: f64, max: f64 },

    #[error("Axis '{name}' needs at least {needed} points, found {found}")]
    AxisTooShort {
        name: String,
        needed: usize,
        found: usize,
    },

    #[error("Invalid parameter: {what}")]
    InvalidParam { what: String },

    #[error("Core error: {0}")]
    Core(#[from] iso_core::IsoError),
}

pub type GeometryResult<T> = Result<T, GeometryError>;
