//! Per-connection handle with a bounded outbound queue.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// Unique identifier of one WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a fresh connection id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to one registered connection.
///
/// Outbound messages go through a bounded queue; a full queue drops the
/// frame rather than blocking the publisher, since a newer seat map will
/// follow anyway.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Connection identifier.
    pub id: ConnectionId,
    /// When the connection registered.
    pub connected_at: DateTime<Utc>,
    /// Outbound message queue.
    tx: mpsc::Sender<String>,
    /// Set once the connection is being torn down.
    closed: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new handle around an outbound queue.
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            connected_at: Utc::now(),
            tx,
            closed: AtomicBool::new(false),
        }
    }

    /// Queue a message without blocking.
    ///
    /// Returns `false` if the frame was dropped (queue full or receiver
    /// gone).
    pub fn send(&self, message: String) -> bool {
        if self.closed.load(Ordering::Relaxed) {
            return false;
        }
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Mark the connection as closed.
    pub fn mark_closed(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }

    /// Whether the connection has been marked closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}
