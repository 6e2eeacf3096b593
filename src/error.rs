use thiserror::Error;

use crate::units::UnitError;

#[derive(Debug, Error)]
pub enum SwapError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unit conversion failed: {0}")]
    UnitConversion(#[from] UnitError),

    #[error("Food not found: {0}")]
    NotFound(String),

    #[error("Data source unavailable ({source_name}): {message}")]
    DataSourceUnavailable {
        source_name: String,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SwapError {
    pub fn unavailable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        SwapError::DataSourceUnavailable {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SwapError>;
