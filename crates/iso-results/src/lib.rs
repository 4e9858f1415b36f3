//! iso-results: ledger of completed stages and adjustment diagnostics.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::compute_config_hash;
pub use store::RunLedger;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stage not recorded: {stage}")]
    StageNotFound { stage: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },
}
