//! Real-time fan-out hub.
//!
//! WebSocket clients submit messages and receive broadcast notifications,
//! some of which are produced by routing a message through a pluggable
//! predictor. A single hub task owns the set of live connections and applies
//! every membership change and fan-out in one total order.

// layers
pub mod domain;
pub mod hub;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
