//! Error types for the session layer.

use boardsync_protocol::ProtocolError;
use boardsync_transport::ConnectionId;

/// Errors raised while gating, registering, or messaging connections.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The client presented the wrong secret. Recoverable: the
    /// connection stays open and may try again.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The connection's outbound queue is closed, meaning its writer has
    /// already shut down. The connection should be treated as gone.
    #[error("outbound queue closed for {0}")]
    OutboundClosed(ConnectionId),

    /// A message could not be encoded for sending.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
