//! UI layer: the axum server, the WebSocket gateway and HTTP endpoints.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
