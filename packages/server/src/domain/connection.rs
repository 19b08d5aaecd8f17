//! One client's outbound send path.

use std::{fmt, sync::Arc};

use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use super::error::SendError;

/// Opaque identity of a live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh, random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An outbound frame. Payloads are reference counted so a broadcast clones a
/// pointer per member, not the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(Arc<str>),
    Binary(Arc<[u8]>),
}

impl Frame {
    pub fn text(text: impl Into<Arc<str>>) -> Self {
        Self::Text(text.into())
    }

    pub fn binary(data: impl Into<Arc<[u8]>>) -> Self {
        Self::Binary(data.into())
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Receiving half of a connection's outbound queue, drained by the transport
/// writer.
pub type Outbox = mpsc::Receiver<Frame>;

/// The hub-side half of a client connection.
///
/// A `Connection` is not `Clone`: whoever holds it holds the only sender of
/// the outbound queue. Once the hub releases it, the writer sees the queue
/// close and shuts the transport down.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    tx: mpsc::Sender<Frame>,
}

impl Connection {
    /// Wrap an existing queue sender.
    pub fn new(id: ConnectionId, tx: mpsc::Sender<Frame>) -> Self {
        Self { id, tx }
    }

    /// Create a connection with a fresh identity and an outbound queue of
    /// `capacity` frames.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero (tokio's bounded channel requirement);
    /// configuration validation rejects zero before it gets here.
    pub fn open(capacity: usize) -> (Self, Outbox) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(ConnectionId::generate(), tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Enqueue a frame without waiting.
    ///
    /// A full queue drops the frame and reports [`SendError::BufferFull`]; a
    /// slow reader never blocks the caller.
    pub fn send(&self, frame: Frame) -> Result<(), SendError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => SendError::BufferFull,
            TrySendError::Closed(_) => SendError::Closed,
        })
    }

    /// Release the transport. Consuming `self` makes a second release
    /// impossible.
    pub fn release(self) {
        tracing::debug!("Releasing transport for connection '{}'", self.id);
        drop(self.tx);
    }
}
