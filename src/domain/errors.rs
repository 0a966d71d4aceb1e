use thiserror::Error;

use crate::infrastructure::chain::ChainClientError;
use crate::infrastructure::persistence::error::DbError;

/// Error raised while turning a rendered chain payload into typed values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("missing field '{0}'")]
    MissingField(String),
    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
    #[error("invalid event phase: {0}")]
    InvalidPhase(String),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

impl DecodeError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        DecodeError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Error raised by a reconciliation handler
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Database error: {0}")]
    DbError(#[from] DbError),
    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),
}

/// Error type for block processing and chain walking
#[derive(Debug, Error)]
pub enum BlockProcessorError {
    #[error("Chain client error: {0}")]
    ChainClientError(#[from] ChainClientError),
    #[error("Database error: {0}")]
    DbError(#[from] DbError),
    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),
    #[error("Reconciliation error: {0}")]
    ReconcileError(#[from] ReconcileError),
}
