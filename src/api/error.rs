use std::path::PathBuf;

use thiserror::Error;

/// Reasons a plan request is rejected before it reaches the engine.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{field} must be a finite number >= 0")]
    Negative { field: String },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    #[error("--loan-term-years must be 15 or 30, got {0}")]
    InvalidLoanTerm(u32),

    #[error("{field} must be on or after {after}")]
    InvalidDate { field: String, after: String },

    #[error("account id {0:?} appears more than once")]
    DuplicateAccount(String),

    #[error("{field} must not be empty")]
    Empty { field: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InputError {
    pub(crate) fn negative(field: impl Into<String>) -> Self {
        InputError::Negative {
            field: field.into(),
        }
    }

    pub(crate) fn out_of_range(field: impl Into<String>, min: f64, max: f64) -> Self {
        InputError::OutOfRange {
            field: field.into(),
            min,
            max,
        }
    }
}
