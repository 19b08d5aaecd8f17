//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tidings_shared::time::{Clock, SystemClock};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    hub::{Hub, HubHandle},
    usecase::RouteMessageUseCase,
};

use super::{
    handler::{get_stats, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Fan-out hub server
///
/// # Example
///
/// ```ignore
/// let server = Server::from_config(config);
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    hub: HubHandle,
    route_message_usecase: Arc<RouteMessageUseCase>,
    started_at: i64,
}

impl Server {
    pub fn new(
        config: ServerConfig,
        hub: HubHandle,
        route_message_usecase: Arc<RouteMessageUseCase>,
        started_at: i64,
    ) -> Self {
        Self {
            config,
            hub,
            route_message_usecase,
            started_at,
        }
    }

    /// Wire up a server from configuration: spawns the hub task and builds the
    /// selected predictor.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: ServerConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let (hub, _hub_task) = Hub::spawn();
        let predictor = config.predictor.build();
        tracing::info!("Using predictor '{}'", predictor.name());

        let route_message_usecase = Arc::new(RouteMessageUseCase::new(
            hub.clone(),
            predictor,
            clock.clone(),
            config.predict_timeout(),
        ));

        Self::new(config, hub, route_message_usecase, clock.now_millis())
    }

    /// Build the router: the WebSocket gateway plus the HTTP endpoints.
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            hub: self.hub.clone(),
            route_message_usecase: self.route_message_usecase.clone(),
            outbound_capacity: self.config.outbound_capacity,
            write_timeout: self.config.write_timeout(),
            started_at: self.started_at,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/stats", get(get_stats))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Serve on an already bound listener until a shutdown signal arrives.
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        tracing::info!("Fan-out hub listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", listener.local_addr()?);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Bind to the configured address and serve.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the server fails.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;
        self.serve(listener).await
    }
}
