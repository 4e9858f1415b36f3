//! Error type for array-file I/O.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[cfg(feature = "netcdf")]
    #[error("NetCDF call {call} failed with status {code}: {message}")]
    NetCdfStatus {
        call: &'static str,
        code: i32,
        message: String,
    },

    #[error("Missing variable '{name}' in {file}")]
    MissingVariable { name: String, file: String },

    #[error("Missing dimension '{name}' in {file}")]
    MissingDimension { name: String, file: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("NetCDF support not enabled (build with the `netcdf` feature)")]
    FeatureDisabled,
}

pub type IoResult<T> = Result<T, IoError>;

impl From<iso_core::IsoError> for IoError {
    fn from(err: iso_core::IsoError) -> Self {
        IoError::InvalidData(err.to_string())
    }
}
