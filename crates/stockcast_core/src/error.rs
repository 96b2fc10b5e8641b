//! Error types for the forecasting pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors raised while loading artifacts or serving a forecast.
///
/// `InsufficientHistory`, `Config` and `ModelLoad` only occur at startup and
/// are fatal. `InvalidInput` and `Inference` are per-request.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// The submitted consumption value is not a finite number.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The history source has fewer rows than the window prefix needs.
    #[error("insufficient history: need at least {needed} rows, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    /// Scaler parameters or history source are malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The model artifact is missing, corrupt, or cannot be planned.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The prepared window does not fit the model, or the run failed.
    #[error("inference failed: {0}")]
    Inference(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ForecastError {
    fn from(e: csv::Error) -> Self {
        ForecastError::Config(format!("history source: {}", e))
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(e: serde_json::Error) -> Self {
        ForecastError::Config(format!("scaler artifact: {}", e))
    }
}
