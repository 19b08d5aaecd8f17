//! WebSocket gateway.
//!
//! Accepts an upgrade, registers a new connection with the hub and runs two
//! tasks for it: one pushing the connection's outbound queue to the socket,
//! one routing what the client sends. When either ends, the other is aborted
//! and the connection is unregistered.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};

use crate::{
    domain::{Connection, ConnectionId, Frame, Outbox},
    ui::state::AppState,
    usecase::RouteError,
};

/// `GET /ws`. Requests that are not valid upgrades are rejected by the
/// extractor before a connection is created.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_failed_upgrade(|e| tracing::warn!("WebSocket upgrade failed: {}", e))
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (connection, outbox) = Connection::open(state.outbound_capacity);
    let id = connection.id();

    if let Err(e) = state.hub.register(connection) {
        tracing::error!("Cannot register connection '{}': {}", id, e);
        return;
    }
    if let Err(e) = state.route_message_usecase.welcome(id) {
        tracing::warn!("Failed to greet connection '{}': {}", id, e);
    }
    tracing::info!("Connection '{}' accepted", id);

    let (sender, receiver) = socket.split();
    let mut send_task = pusher_loop(id, outbox, sender, state.write_timeout);
    let mut recv_task = reader_loop(id, receiver, state.clone());

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if let Err(e) = state.hub.unregister(id) {
        tracing::warn!("Failed to unregister connection '{}': {}", id, e);
    }
    tracing::info!("Connection '{}' closed", id);
}

fn into_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text.to_string().into()),
        Frame::Binary(data) => Message::Binary(data.to_vec().into()),
    }
}

/// Drains the connection's outbound queue into the socket.
///
/// Ends when a write fails or exceeds `write_timeout`, or when the hub
/// releases the connection (the queue closes), in which case a Close frame is
/// sent first.
fn pusher_loop(
    id: ConnectionId,
    mut outbox: Outbox,
    mut sender: SplitSink<WebSocket, Message>,
    write_timeout: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = outbox.recv().await {
            match tokio::time::timeout(write_timeout, sender.send(into_message(frame))).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!("Write to connection '{}' failed: {}", id, e);
                    return;
                }
                Err(_) => {
                    tracing::warn!(
                        "Write to connection '{}' timed out after {:?}",
                        id,
                        write_timeout
                    );
                    return;
                }
            }
        }

        tracing::debug!("Connection '{}' released by hub, closing socket", id);
        let _ = tokio::time::timeout(write_timeout, sender.send(Message::Close(None))).await;
    })
}

/// Routes frames received from the client.
fn reader_loop(
    id: ConnectionId,
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on connection '{}': {}", id, e);
                    break;
                }
            };

            let routed = match msg {
                Message::Text(text) => {
                    tracing::debug!("Received text from '{}': {}", id, text.as_str());
                    state
                        .route_message_usecase
                        .execute(id, text.as_str())
                        .map(|_| ())
                }
                Message::Binary(data) => {
                    tracing::debug!("Received {} bytes from '{}'", data.len(), id);
                    state.route_message_usecase.execute_binary(data.to_vec())
                }
                Message::Ping(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                    tracing::debug!("Received ping from '{}'", id);
                    Ok(())
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", id);
                    break;
                }
                Message::Pong(_) => Ok(()),
            };

            match routed {
                Ok(()) => {}
                Err(RouteError::Hub(e)) => {
                    tracing::error!("Hub unavailable, dropping connection '{}': {}", id, e);
                    break;
                }
                Err(e) => tracing::warn!("Failed to route message from '{}': {}", id, e),
            }
        }
    })
}
