//! Transport abstraction layer for boardsync.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the byte-stream carrying protocol messages. Both traits deal in whole
//! messages: an implementation must preserve message boundaries, so a
//! receiver never observes a partial or merged message.
//!
//! # Implementations
//!
//! - [`WebSocketTransport`]: boundaries come from WebSocket frames
//!   (feature `websocket`, on by default).
//! - [`TcpTransport`]: raw TCP, every message carried in a
//!   length-prefixed [`frame`].

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

mod error;
pub mod frame;
mod tcp;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use tcp::{TcpConnection, TcpTransport};
#[cfg(feature = "websocket")]
pub use websocket::{HANDSHAKE_TIMEOUT, WebSocketConnection, WebSocketTransport};

/// Counter for generating unique connection IDs across all transports.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates the next process-unique `ConnectionId`.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
///
/// Methods return `impl Future + Send` rather than being `async fn` so
/// that generic callers can spawn the futures onto the Tokio runtime.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// A single connection that can send and receive whole messages.
///
/// Implementations must allow `send` and `recv` to run concurrently
/// from different tasks: one task blocked in `recv` must never stall a
/// writer.
pub trait Connection: Send + Sync + 'static {
    /// Sends one message to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
