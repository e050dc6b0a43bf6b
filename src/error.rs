use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No raw data files found in {dir}")]
    EmptyInput { dir: PathBuf },

    #[error("Filename does not match expected pattern: {0}")]
    InvalidFilename(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
