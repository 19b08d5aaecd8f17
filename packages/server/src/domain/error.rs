//! Domain error types.

use thiserror::Error;

/// Failure to enqueue a frame on a connection's outbound queue.
///
/// Both variants mean the connection can no longer be served and must be
/// unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    /// The outbound queue is at capacity; the frame was dropped.
    #[error("outbound buffer is full")]
    BufferFull,

    /// The transport writer has gone away.
    #[error("transport is closed")]
    Closed,
}

/// Failure of a single prediction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictError {
    /// The predictor has nothing to work with.
    #[error("input is empty")]
    EmptyInput,

    /// The model itself failed.
    #[error("prediction failed: {0}")]
    Failed(String),

    /// The prediction did not finish within the configured budget.
    #[error("prediction timed out after {0} ms")]
    Timeout(u64),
}
