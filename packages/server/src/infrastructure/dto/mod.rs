//! Data Transfer Objects (DTOs) for the WebSocket wire format.
//!
//! - `websocket`: inbound and outbound message shapes
//! - `conversion`: domain to DTO conversion

pub mod conversion;
pub mod websocket;
