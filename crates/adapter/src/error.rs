//! Adapter-level error types.

use thiserror::Error;

/// Errors produced while running a trace.
///
/// Every variant surfaces to the caller; the adapter never retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// The request was rejected before any I/O took place.
    #[error("invalid trace input: {0}")]
    InvalidInput(String),

    /// Network failure, non-success status, or an undecodable payload.
    #[error("trace transport error: {0}")]
    Transport(String),

    /// The owning operation was cancelled while the request was in flight.
    #[error("trace cancelled")]
    Cancelled,
}

impl TraceError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}
