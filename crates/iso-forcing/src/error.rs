//! Error types for forcing construction.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ForcingError {
    #[error("Scaling schedule is empty")]
    EmptySchedule,

    #[error("First scale factor must be nonzero and finite, got {value}")]
    ZeroReferenceScale { value: f64 },

    #[error("Years must start at 1, got {first}")]
    FirstYear { first: u32 },

    #[error("Years must be consecutive: year {year} at index {index}")]
    YearGap { index: usize, year: u32 },

    #[error("Schedule has {years} years but {scales} scale factors")]
    LengthMismatch { years: usize, scales: usize },

    #[error("Reference field '{name}' has {found} cells, expected {expected}")]
    CellCount {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Year {year} does not fit the timestamp format")]
    YearOutOfRange { year: u32 },
}

pub type ForcingResult<T> = Result<T, ForcingError>;
