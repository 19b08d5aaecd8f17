//! Client side of the hub: command queue and handle.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{Connection, ConnectionId, Frame};

use super::error::HubError;

/// Counters maintained by the hub task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HubStats {
    /// Current number of registered connections.
    pub connections: usize,
    /// Connections admitted since start (duplicates not counted).
    pub registered_total: u64,
    /// Transports released since start.
    pub released_total: u64,
    /// Frames dropped because a connection's outbound buffer was full.
    pub dropped_frames: u64,
}

/// Commands accepted by the hub task. All of them travel through one queue,
/// so their relative order is the order they were submitted in.
#[derive(Debug)]
pub(super) enum HubCommand {
    Register(Connection),
    Unregister(ConnectionId),
    Broadcast(Frame),
    SendTo(ConnectionId, Frame),
    Stats(oneshot::Sender<HubStats>),
}

/// Cloneable handle to a running [`super::Hub`].
///
/// Submitting never waits on the hub: commands are queued and applied by the
/// hub task. A `Ok(())` means "queued", not "applied".
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    pub(super) fn new(tx: mpsc::UnboundedSender<HubCommand>) -> Self {
        Self { tx }
    }

    fn submit(&self, command: HubCommand) -> Result<(), HubError> {
        self.tx.send(command).map_err(|_| HubError::Closed)
    }

    /// Add a connection to the membership set.
    pub fn register(&self, connection: Connection) -> Result<(), HubError> {
        self.submit(HubCommand::Register(connection))
    }

    /// Remove a connection and release its transport. No-op if it is not a
    /// member.
    pub fn unregister(&self, id: ConnectionId) -> Result<(), HubError> {
        self.submit(HubCommand::Unregister(id))
    }

    /// Deliver a frame to every registered connection.
    pub fn broadcast(&self, frame: Frame) -> Result<(), HubError> {
        self.submit(HubCommand::Broadcast(frame))
    }

    /// Deliver a frame to a single registered connection.
    pub fn send_to(&self, id: ConnectionId, frame: Frame) -> Result<(), HubError> {
        self.submit(HubCommand::SendTo(id, frame))
    }

    /// Snapshot the hub's counters.
    ///
    /// The snapshot is taken after every command submitted before this call
    /// has been applied.
    pub async fn stats(&self) -> Result<HubStats, HubError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(HubCommand::Stats(reply_tx))?;
        reply_rx.await.map_err(|_| HubError::Closed)
    }
}
