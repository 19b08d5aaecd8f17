//! UseCase layer.

mod error;
mod route_message;

pub use error::RouteError;
pub use route_message::{RouteMessageUseCase, Routed};
