//! WebSocket message DTOs.

use serde::{Deserialize, Serialize};

/// Message type tag shared by inbound and outbound messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    /// Inbound: relay to everyone. Outbound: a relayed message.
    #[default]
    Chat,
    /// Inbound: run the predictor on `message`.
    Predict,
    /// Outbound: a predictor result.
    Prediction,
    /// Outbound: a failure for the receiving connection only.
    Error,
    /// Outbound: first message on a new connection.
    Welcome,
}

/// A message submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub r#type: MessageType,
    pub message: String,
    #[serde(default)]
    pub user_id: u64,
}

impl InboundMessage {
    /// Parse a text frame. Anything that is not a JSON message is relayed as a
    /// chat message from user 0.
    pub fn parse_or_plain(text: &str) -> Self {
        match serde_json::from_str::<Self>(text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!("Text frame is not a JSON message ({}), relaying as plain text", e);
                Self {
                    r#type: MessageType::Chat,
                    message: text.to_string(),
                    user_id: 0,
                }
            }
        }
    }
}

/// A notification as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub r#type: MessageType,
    pub message: String,
    pub user_id: u64,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
}
