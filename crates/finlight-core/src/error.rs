//! Error types for FinLight

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Categorization model is not loaded")]
    ModelNotReady,

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Malformed feedback record at line {line}: {reason}")]
    MalformedFeedbackRecord { line: u64, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
