//! Domain layer: connections, notifications and the predictor capability.
//!
//! Nothing here depends on axum or on the hub's task; the types are shared by
//! the hub, the message router and the gateway.

pub mod connection;
pub mod error;
pub mod notification;
pub mod predictor;

pub use connection::{Connection, ConnectionId, Frame, Outbox};
pub use error::{PredictError, SendError};
pub use notification::{Notification, NotificationKind, UserId};
pub use predictor::Predictor;

#[cfg(test)]
pub use predictor::MockPredictor;
