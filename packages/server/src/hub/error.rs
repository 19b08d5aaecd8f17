use thiserror::Error;

/// Errors returned by [`super::HubHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HubError {
    /// The hub task has stopped and no longer accepts commands.
    #[error("hub is not running")]
    Closed,
}
