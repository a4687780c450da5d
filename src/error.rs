//! Error handling for the projection engine
//!
//! The engine reports failures through [`CalcError`]; the CLI layer wraps
//! everything else in anyhow for context chaining.

use serde::Serialize;
use thiserror::Error;

/// Failures a projection can end in
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("reference rate unavailable: {0}")]
    RateUnavailable(String),

    #[error("division by zero: {0}")]
    DivisionByZero(String),
}

impl CalcError {
    /// Stable tag used by the error boundary (`{kind, message}`)
    pub fn kind(&self) -> &'static str {
        match self {
            CalcError::InvalidInput(_) => "invalid_input",
            CalcError::RateUnavailable(_) => "rate_unavailable",
            CalcError::DivisionByZero(_) => "division_by_zero",
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

/// Flattened error shown to the user in place of a report
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: String,
    pub message: String,
}

impl ErrorReport {
    /// Build a report from any application error, keeping the engine's kind
    /// when one is in the chain.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        match err.chain().find_map(|e| e.downcast_ref::<CalcError>()) {
            Some(calc) => ErrorReport {
                kind: calc.kind().to_string(),
                message: format!("{:#}", err),
            },
            None => ErrorReport {
                kind: "error".to_string(),
                message: format!("{:#}", err),
            },
        }
    }
}

/// Result type alias for application-level operations
pub type Result<T> = anyhow::Result<T>;
