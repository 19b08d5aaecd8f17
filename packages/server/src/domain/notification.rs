//! Notifications fanned out to clients.

use std::fmt;

use super::connection::ConnectionId;

/// Identity of the user a message originates from.
///
/// Clients assert it themselves; there is no authentication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UserId(u64);

impl UserId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a notification is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    /// A message relayed as-is.
    Chat,
    /// The output of a predictor for `input`.
    Prediction { model: String, input: String },
    /// A failure reported back to the originating connection.
    Error,
    /// Sent once to a connection right after it is registered.
    Welcome { connection_id: ConnectionId },
}

/// An immutable notification: a text payload plus its originating user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    kind: NotificationKind,
    message: String,
    user_id: UserId,
    timestamp: i64,
}

impl Notification {
    pub fn chat(message: impl Into<String>, user_id: UserId, timestamp: i64) -> Self {
        Self {
            kind: NotificationKind::Chat,
            message: message.into(),
            user_id,
            timestamp,
        }
    }

    pub fn prediction(
        model: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
        user_id: UserId,
        timestamp: i64,
    ) -> Self {
        Self {
            kind: NotificationKind::Prediction {
                model: model.into(),
                input: input.into(),
            },
            message: output.into(),
            user_id,
            timestamp,
        }
    }

    pub fn error(message: impl Into<String>, user_id: UserId, timestamp: i64) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            user_id,
            timestamp,
        }
    }

    pub fn welcome(connection_id: ConnectionId, timestamp: i64) -> Self {
        Self {
            kind: NotificationKind::Welcome { connection_id },
            message: "connected".to_string(),
            user_id: UserId::default(),
            timestamp,
        }
    }

    pub fn kind(&self) -> &NotificationKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Unix timestamp in milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}
