//! Errors raised while turning an activity log into events.

use thiserror::Error;

use crate::lexer::LexError;

#[derive(Debug, Error)]
pub enum BuildLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Lex(#[from] LexError),
    /// The token stream did not have the shape of an activity log.
    #[error("unexpected activity log structure: {0}")]
    StructuralMismatch(String),
    #[error("invalid timestamp: {0} s")]
    InvalidTimestamp(f64),
    /// The current filter removed every event.
    #[error("no events for current filter")]
    EmptyResult,
}

impl BuildLogError {
    /// Whether the caller can recover by changing the filter instead of
    /// picking another log.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptyResult)
    }

    pub(crate) fn mismatch(message: impl Into<String>) -> Self {
        Self::StructuralMismatch(message.into())
    }
}
