//! Conversion between domain notifications and wire DTOs.

use crate::domain::{Frame, Notification, NotificationKind};
use crate::infrastructure::dto::websocket as dto;

impl From<&Notification> for dto::NotificationMessage {
    fn from(notification: &Notification) -> Self {
        let (r#type, model_name, input, connection_id) = match notification.kind() {
            NotificationKind::Chat => (dto::MessageType::Chat, None, None, None),
            NotificationKind::Prediction { model, input } => (
                dto::MessageType::Prediction,
                Some(model.clone()),
                Some(input.clone()),
                None,
            ),
            NotificationKind::Error => (dto::MessageType::Error, None, None, None),
            NotificationKind::Welcome { connection_id } => (
                dto::MessageType::Welcome,
                None,
                None,
                Some(connection_id.to_string()),
            ),
        };

        Self {
            r#type,
            message: notification.message().to_string(),
            user_id: notification.user_id().value(),
            timestamp: notification.timestamp(),
            model: model_name,
            input,
            connection_id,
        }
    }
}

/// Serialize a notification into an outbound text frame.
pub fn encode_notification(notification: &Notification) -> Result<Frame, serde_json::Error> {
    let json = serde_json::to_string(&dto::NotificationMessage::from(notification))?;
    Ok(Frame::text(json))
}
