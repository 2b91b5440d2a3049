//! Node-level error type.

use adapter::TraceError;
use thiserror::Error;

/// Errors returned by a node's `execute` method.
///
/// The host uses the variant to decide retry behaviour:
/// - `Retryable` — the host may re-run the node.
/// - `Fatal`     — the execution should fail immediately.
/// - `Cancelled` — the execution was aborted by its owner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// Transient failure; the host may re-try the node.
    #[error("retryable node error: {0}")]
    Retryable(String),

    /// Permanent failure; no retry should be attempted.
    #[error("fatal node error: {0}")]
    Fatal(String),

    /// The node's cancellation signal fired before it finished.
    #[error("node cancelled")]
    Cancelled,
}

impl From<TraceError> for NodeError {
    fn from(err: TraceError) -> Self {
        match err {
            TraceError::InvalidInput(_) => NodeError::Fatal(err.to_string()),
            TraceError::Transport(_) => NodeError::Retryable(err.to_string()),
            TraceError::Cancelled => NodeError::Cancelled,
        }
    }
}
