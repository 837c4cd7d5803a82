//! Error types for request validation, assumption loading and present-value calculations

use thiserror::Error;

/// Rejections raised before any computation proceeds
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unsupported modality tag: {0}")]
    UnsupportedModality(String),

    #[error("unsupported benefit category tag: {0}")]
    UnsupportedCategory(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing {0} terms for this scenario")]
    MissingTerms(&'static str),

    #[error("failed to read assumptions: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidInput(message.into())
    }
}

/// Present-value failures. These never escape the formula library as `Err`;
/// they are turned into flagged zero-value results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    #[error("no eligible dependents to value")]
    NoDependents,

    #[error("necessary unit capital is not positive ({0})")]
    Degenerate(f64),
}

pub type EngineResult<T> = Result<T, EngineError>;
