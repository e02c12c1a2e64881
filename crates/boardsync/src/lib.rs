//! # boardsync
//!
//! Authoritative state sync for a shared board game.
//!
//! One server process owns the game: sixteen tokens, four two-sided dice
//! and a short roll history. Clients send intents (`roll`, `move`,
//! `reset`) and every accepted change is broadcast to all connected
//! clients in the order it happened. Optionally the board is gated
//! behind a shared password.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use boardsync::prelude::*;
//!
//! # async fn start() -> Result<(), BoardsyncError> {
//! let server = BoardServer::builder()
//!     .bind("0.0.0.0:5555")
//!     .store_config(StoreConfig::seeded(7))
//!     .build_websocket(OpenAccess)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::BoardsyncError;
pub use handler::{ERROR_MALFORMED, ERROR_UNAUTHENTICATED};
pub use server::{BoardServer, BoardServerBuilder, DEFAULT_BIND_ADDR};

pub use boardsync_protocol as protocol;
pub use boardsync_session as session;
pub use boardsync_state as state;
pub use boardsync_transport as transport;

/// Everything needed to start a server.
pub mod prelude {
    pub use crate::{BoardServer, BoardServerBuilder, BoardsyncError};
    pub use boardsync_protocol::{ClientMessage, GameState, JsonCodec, ServerMessage};
    pub use boardsync_session::{Authenticator, OpenAccess, SharedSecret};
    pub use boardsync_state::{StateHandle, StoreConfig};
}
