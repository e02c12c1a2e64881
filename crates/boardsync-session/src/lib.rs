//! Connection gating and fan-out for boardsync.
//!
//! This crate decides who may talk to the board and who hears about
//! changes to it:
//!
//! 1. **Authentication**: the shared-secret gate ([`Authenticator`],
//!    [`SharedSecret`], [`OpenAccess`])
//! 2. **Lifecycle**: what a connection may do right now
//!    ([`ConnectionState`])
//! 3. **Registry**: which connections receive broadcasts
//!    ([`ConnectionRegistry`], [`Outbound`])
//! 4. **Fan-out**: encode once, deliver to everyone ([`Broadcaster`])
//!
//! # How it fits in the stack
//!
//! ```text
//! State Layer (above)   ← broadcasts every accepted change
//!     ↕
//! Session Layer (this crate)  ← gate, registry, outbound queues
//!     ↕
//! Protocol Layer (below)  ← ClientMessage, ServerMessage, Codec
//! ```

mod auth;
mod broadcast;
mod connection;
mod error;
mod registry;

pub use auth::{Authenticator, OpenAccess, SharedSecret};
pub use broadcast::Broadcaster;
pub use connection::ConnectionState;
pub use error::SessionError;
pub use registry::{BroadcastReport, ConnectionRegistry, Frame, Outbound, SharedRegistry};
