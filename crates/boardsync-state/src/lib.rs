//! Authoritative game state for boardsync.
//!
//! One [`StateStore`] actor per server owns the [`GameState`] and
//! serializes every change to it. Everything else talks to the store
//! through a cloneable [`StateHandle`].
//!
//! # Key types
//!
//! - [`StateStore`] / [`StateHandle`]: the actor and its command handle
//! - [`StoreConfig`]: dice seed and channel capacity
//! - [`dice`]: the dice engine and the bust rule
//! - [`layout`]: the canonical starting board
//! - [`rules`]: pure state transitions for roll, move and reset
//!
//! [`GameState`]: boardsync_protocol::GameState

mod config;
pub mod dice;
mod error;
pub mod layout;
pub mod rules;
mod store;

pub use config::{DEFAULT_CHANNEL_SIZE, StoreConfig};
pub use dice::{BUST_SCORE, DiceRoll};
pub use error::StateError;
pub use store::{StateHandle, StateStore};
