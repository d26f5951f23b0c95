//! Typed errors for the classifier contract and the journal.

use thiserror::Error;

use crate::types::StrategyLabel;

/// The caller handed the classifier a leg it must not construct.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidLegError {
    #[error("leg {index}: missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("leg {index}: unknown action '{value}' (expected BUY or SELL)")]
    UnknownAction { index: usize, value: String },

    #[error("leg {index}: unknown option type '{value}' (expected CALL or PUT)")]
    UnknownOptionType { index: usize, value: String },
}

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("trade rejected: {0}")]
    Rejected(StrategyLabel),

    #[error(transparent)]
    InvalidLeg(#[from] InvalidLegError),

    #[error("trade {0} not found")]
    NotFound(u64),

    #[error("journal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal JSON failed: {0}")]
    Json(#[from] serde_json::Error),
}
