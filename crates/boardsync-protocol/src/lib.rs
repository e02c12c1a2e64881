//! Wire protocol for boardsync.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Model** ([`GameState`], [`Token`], [`DiceSet`], [`RollHistory`]):
//!   the shared board, exactly as it appears on the wire.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): closed sets of
//!   tagged intents and updates.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become
//!   bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! The protocol layer sits between transport (whole messages as bytes)
//! and session/state (who may do what). It knows nothing about
//! connections; it only knows how to encode and validate messages.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → State store
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{ClientMessage, ServerMessage};
pub use types::{
    Color, DiceFace, DiceSet, GameState, HistoryOverflow, RollHistory, RollHistoryEntry,
    Token, DICE_COUNT, ROLL_HISTORY_CAP,
};
