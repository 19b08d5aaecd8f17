//! UseCase: 受信メッセージのルーティング
//!
//! Turns frames received from a client into notifications. Chat messages are
//! broadcast through the hub; predict requests run on their own task so a
//! slow model never holds up the hub or the connection's reader.
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RouteMessageUseCase::execute() の chat / predict の振り分け
//! - 予測失敗時のエラー通知と Hub への非影響
//!
//! ### どのような状況を想定しているか
//! - 正常系：chat のブロードキャスト、予測結果のブロードキャスト
//! - 異常系：予測エラー、予測タイムアウト、未対応のメッセージ型

use std::{sync::Arc, time::Duration};

use tidings_shared::time::Clock;
use tokio::task::JoinHandle;

use crate::{
    domain::{ConnectionId, Frame, Notification, PredictError, Predictor, UserId},
    hub::HubHandle,
    infrastructure::dto::{
        conversion::encode_notification,
        websocket::{InboundMessage, MessageType},
    },
};

use super::error::RouteError;

/// What happened to an inbound message.
#[derive(Debug)]
pub enum Routed {
    /// Submitted to the hub for broadcast.
    Broadcast,
    /// Handed to a prediction task; the handle resolves once its result (or
    /// failure) has been submitted to the hub.
    Prediction(JoinHandle<()>),
    /// Not a message clients may send; the sender got an error notification.
    Rejected,
}

/// 受信メッセージのルーティングのユースケース
pub struct RouteMessageUseCase {
    hub: HubHandle,
    predictor: Arc<dyn Predictor>,
    clock: Arc<dyn Clock>,
    predict_timeout: Duration,
}

impl RouteMessageUseCase {
    pub fn new(
        hub: HubHandle,
        predictor: Arc<dyn Predictor>,
        clock: Arc<dyn Clock>,
        predict_timeout: Duration,
    ) -> Self {
        Self {
            hub,
            predictor,
            clock,
            predict_timeout,
        }
    }

    /// Name of the configured predictor.
    pub fn predictor_name(&self) -> &'static str {
        self.predictor.name()
    }

    /// Route a text frame received from `from`.
    pub fn execute(&self, from: ConnectionId, text: &str) -> Result<Routed, RouteError> {
        let inbound = InboundMessage::parse_or_plain(text);
        let user_id = UserId::new(inbound.user_id);

        match inbound.r#type {
            MessageType::Chat => {
                let notification =
                    Notification::chat(inbound.message, user_id, self.clock.now_millis());
                self.hub.broadcast(encode_notification(&notification)?)?;
                tracing::debug!("Chat from user {} submitted for broadcast", user_id);
                Ok(Routed::Broadcast)
            }
            MessageType::Predict => Ok(Routed::Prediction(self.dispatch_prediction(
                from,
                user_id,
                inbound.message,
            ))),
            other => {
                tracing::warn!(
                    "Connection '{}' sent unsupported message type {:?}",
                    from,
                    other
                );
                let notification = Notification::error(
                    "unsupported message type",
                    user_id,
                    self.clock.now_millis(),
                );
                self.hub.send_to(from, encode_notification(&notification)?)?;
                Ok(Routed::Rejected)
            }
        }
    }

    /// Relay a binary frame to everyone, unchanged.
    pub fn execute_binary(&self, data: Vec<u8>) -> Result<(), RouteError> {
        self.hub.broadcast(Frame::binary(data))?;
        Ok(())
    }

    /// Greet a freshly registered connection with its identity.
    pub fn welcome(&self, id: ConnectionId) -> Result<(), RouteError> {
        let notification = Notification::welcome(id, self.clock.now_millis());
        self.hub.send_to(id, encode_notification(&notification)?)?;
        Ok(())
    }

    fn dispatch_prediction(
        &self,
        from: ConnectionId,
        user_id: UserId,
        input: String,
    ) -> JoinHandle<()> {
        let hub = self.hub.clone();
        let predictor = self.predictor.clone();
        let clock = self.clock.clone();
        let timeout = self.predict_timeout;

        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, predictor.predict(&input)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(PredictError::Timeout(timeout.as_millis() as u64)),
            };

            let submitted = match outcome {
                Ok(output) => {
                    let notification = Notification::prediction(
                        predictor.name(),
                        input,
                        output,
                        user_id,
                        clock.now_millis(),
                    );
                    encode_notification(&notification)
                        .map_err(RouteError::from)
                        .and_then(|frame| hub.broadcast(frame).map_err(RouteError::from))
                }
                Err(e) => {
                    tracing::warn!("Prediction for connection '{}' failed: {}", from, e);
                    let notification =
                        Notification::error(e.to_string(), user_id, clock.now_millis());
                    encode_notification(&notification)
                        .map_err(RouteError::from)
                        .and_then(|frame| hub.send_to(from, frame).map_err(RouteError::from))
                }
            };

            if let Err(e) = submitted {
                tracing::warn!("Dropping prediction result for '{}': {}", from, e);
            }
        })
    }
}
