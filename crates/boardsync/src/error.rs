//! Unified error type for the boardsync server.

use boardsync_protocol::ProtocolError;
use boardsync_session::SessionError;
use boardsync_state::StateError;
use boardsync_transport::TransportError;

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` attributes let `?` lift a sub-crate error into this
/// type, so the handler and the server speak one error type.
#[derive(Debug, thiserror::Error)]
pub enum BoardsyncError {
    /// Bind, accept, send or receive failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A message could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Auth failed or a connection's outbound queue is gone.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The state store has stopped.
    #[error(transparent)]
    State(#[from] StateError),
}
