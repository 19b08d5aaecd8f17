//! Connection registry and broadcast core.
//!
//! A single [`Hub`] task owns the membership set. Everything else talks to it
//! through a cloneable [`HubHandle`], whose commands are applied one at a time
//! in submission order.

mod actor;
mod error;
mod handle;

pub use actor::Hub;
pub use error::HubError;
pub use handle::{HubHandle, HubStats};
