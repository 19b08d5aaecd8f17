//! UseCase error types.

use thiserror::Error;

use crate::hub::HubError;

/// Errors from routing an inbound message.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Hub(#[from] HubError),

    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}
