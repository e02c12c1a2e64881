//! The connection registry: who receives broadcasts.
//!
//! A connection is represented here only by its [`Outbound`] queue, never
//! by the socket itself. Pushing into an unbounded queue never blocks, so
//! a broadcast walks the whole registry without waiting on any client;
//! each connection's writer task drains its own queue at its own pace.
//!
//! # Concurrency note
//!
//! `ConnectionRegistry` is a plain `HashMap` and is not thread-safe by
//! itself. It is shared as [`SharedRegistry`] (one async mutex), which
//! makes register, deregister and broadcast mutually exclusive: a
//! connection is either in the registry for the whole of a broadcast or
//! for none of it.

use std::collections::HashMap;
use std::sync::Arc;

use boardsync_transport::ConnectionId;
use tokio::sync::{mpsc, Mutex};

use crate::SessionError;

/// One encoded message, shared by every queue it is pushed into.
pub type Frame = Arc<[u8]>;

/// The registry as shared between the state store and connection tasks.
pub type SharedRegistry = Arc<Mutex<ConnectionRegistry>>;

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// The sending side of one connection's outbound queue.
///
/// Cheap to clone. The matching receiver belongs to the connection's
/// writer task; once that task exits, every send fails with
/// [`SessionError::OutboundClosed`].
#[derive(Debug, Clone)]
pub struct Outbound {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Frame>,
}

impl Outbound {
    /// Creates a queue for connection `id`.
    pub fn channel(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a frame for the writer task.
    pub fn send(&self, frame: Frame) -> Result<(), SessionError> {
        self.tx
            .send(frame)
            .map_err(|_| SessionError::OutboundClosed(self.id))
    }

    /// Returns `true` once the writer task has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ---------------------------------------------------------------------------
// ConnectionRegistry
// ---------------------------------------------------------------------------

/// Result of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections the frame was queued for.
    pub delivered: usize,
    /// Connections found dead during this broadcast and removed.
    pub pruned: Vec<ConnectionId>,
}

/// Tracks every live, registered connection.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Outbound>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a new, empty registry for sharing.
    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Adds a connection. Returns `false` if the id was already present
    /// (its queue is replaced).
    pub fn register(&mut self, outbound: Outbound) -> bool {
        let id = outbound.id();
        let fresh = self.connections.insert(id, outbound).is_none();
        tracing::debug!(%id, connections = self.connections.len(), "connection registered");
        fresh
    }

    /// Removes a connection. Returns `false` if it wasn't registered
    /// (e.g. already pruned by a broadcast).
    pub fn deregister(&mut self, id: ConnectionId) -> bool {
        let removed = self.connections.remove(&id).is_some();
        if removed {
            tracing::debug!(%id, connections = self.connections.len(), "connection deregistered");
        }
        removed
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Visits every registered connection.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Outbound),
    {
        self.connections.values().for_each(|outbound| f(outbound));
    }

    /// Queues `frame` for every registered connection.
    ///
    /// A connection whose queue is closed is removed and skipped; the
    /// frame is not retried for it and the remaining connections are
    /// still served.
    pub fn broadcast(&mut self, frame: &Frame) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for (id, outbound) in &self.connections {
            match outbound.send(Arc::clone(frame)) {
                Ok(()) => report.delivered += 1,
                Err(_) => report.pruned.push(*id),
            }
        }

        for id in &report.pruned {
            self.connections.remove(id);
            tracing::debug!(%id, "pruned dead connection during broadcast");
        }

        report
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
