//! Shared application state.

use std::{sync::Arc, time::Duration};

use crate::{hub::HubHandle, usecase::RouteMessageUseCase};

/// State shared by every request handler.
pub struct AppState {
    /// Handle to the hub task
    pub hub: HubHandle,
    /// RouteMessageUseCase（受信メッセージのルーティング）
    pub route_message_usecase: Arc<RouteMessageUseCase>,
    /// Outbound queue capacity given to each new connection
    pub outbound_capacity: usize,
    /// Upper bound on a single socket write
    pub write_timeout: Duration,
    /// Unix timestamp (milliseconds) at which the server started
    pub started_at: i64,
}
