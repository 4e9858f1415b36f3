//! Error types for the adjustment loop.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdjustError {
    #[error("Unsupported variable to modify: {mode} (expected 'ssh' or 'landIcePressure')")]
    UnsupportedMode { mode: String },

    #[error("Field '{name}' has {found} entries, expected {expected}")]
    CellCount {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Non-physical water column at cell {cell}: old depth {old_depth} m, new depth {new_depth} m")]
    NonPhysicalColumn {
        cell: usize,
        old_depth: f64,
        new_depth: f64,
    },

    #[error("Forward model failed at iteration {iteration}: {message}")]
    Model { iteration: usize, message: String },

    #[error("Archive error: {message}")]
    Archive { message: String },
}

pub type AdjustResult<T> = Result<T, AdjustError>;
