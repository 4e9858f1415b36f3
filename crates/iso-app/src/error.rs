//! Error types for the iso-app service layer.

use std::path::PathBuf;

/// Application error wrapping the backend crates' errors behind one
/// interface for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read configuration file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Forcing error: {0}")]
    Forcing(String),

    #[error("Adjustment error: {0}")]
    Adjust(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("File error: {0}")]
    Files(String),

    #[error("Missing input: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} failed with {status}")]
    Collaborator { program: String, status: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for iso-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<iso_project::ProjectError> for AppError {
    fn from(err: iso_project::ProjectError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<iso_project::ValidationError> for AppError {
    fn from(err: iso_project::ValidationError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<iso_geometry::GeometryError> for AppError {
    fn from(err: iso_geometry::GeometryError) -> Self {
        AppError::Geometry(err.to_string())
    }
}

impl From<iso_forcing::ForcingError> for AppError {
    fn from(err: iso_forcing::ForcingError) -> Self {
        AppError::Forcing(err.to_string())
    }
}

impl From<iso_adjust::AdjustError> for AppError {
    fn from(err: iso_adjust::AdjustError) -> Self {
        AppError::Adjust(err.to_string())
    }
}

impl From<iso_results::ResultsError> for AppError {
    fn from(err: iso_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}

impl From<iso_io::IoError> for AppError {
    fn from(err: iso_io::IoError) -> Self {
        AppError::Files(err.to_string())
    }
}
