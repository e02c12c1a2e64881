//! Wire messages exchanged between clients and the server.
//!
//! Both directions are closed, internally tagged enums:
//!
//! ```text
//! { "type": "move", "token_id": "red-0", "x": 10, "y": 20 }
//! ```
//!
//! Decoding is the validation step. An unknown `"type"`, a missing or
//! wrongly typed field, or (for client messages) an unexpected field makes
//! the whole message fail to decode; nothing reaches the state store
//! unless it matches one of these shapes exactly.

use serde::{Deserialize, Serialize};

use crate::{DiceSet, GameState, RollHistory, Token};

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Intents a client can submit.
///
/// Clients never send state, only requests to change it. Token moves
/// name exactly one token; the server decides what the rest of the board
/// looks like.
///
/// Fieldless intents are empty struct variants: `deny_unknown_fields`
/// is not applied to unit variants of an internally tagged enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ClientMessage {
    /// Present the shared secret. Answered with
    /// [`ServerMessage::AuthResult`].
    Auth { password: String },

    /// Ask for a full [`ServerMessage::GameState`] snapshot.
    RequestState {},

    /// Throw the four dice.
    Roll {},

    /// Move one token to a new position.
    Move { token_id: String, x: f64, y: f64 },

    /// Restore the initial board.
    Reset {},

    /// Close this connection.
    Disconnect {},
}

impl ClientMessage {
    /// Returns `true` for messages that change the shared game state.
    /// These are refused until the connection is authenticated.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Roll {} | Self::Move { .. } | Self::Reset {})
    }

    /// The wire tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::RequestState {} => "request_state",
            Self::Roll {} => "roll",
            Self::Move { .. } => "move",
            Self::Reset {} => "reset",
            Self::Disconnect {} => "disconnect",
        }
    }
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Everything the server sends.
///
/// `AuthResult`, `GameState` and `Error` are direct replies to one
/// connection; `DiceRolled`, `TokensUpdated` and `GameReset` are
/// broadcast to every registered connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Outcome of an `auth` request. A failure leaves the connection open
    /// so the client can try again.
    AuthResult { success: bool },

    /// Full snapshot, sent on join and on `request_state`.
    GameState(GameState),

    /// A roll was accepted.
    DiceRolled {
        dice: DiceSet,
        white_count: u8,
        roll_history: RollHistory,
    },

    /// A move was accepted (including moves naming an unknown token,
    /// which only bump `move_count`).
    TokensUpdated { tokens: Vec<Token>, move_count: u64 },

    /// The board was reset. Carries the new full state.
    GameReset(GameState),

    /// The request could not be served. `code` follows HTTP conventions
    /// (400 malformed, 401 not authenticated).
    Error { code: u16, message: String },
}

impl ServerMessage {
    /// The wire tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthResult { .. } => "auth_result",
            Self::GameState(_) => "game_state",
            Self::DiceRolled { .. } => "dice_rolled",
            Self::TokensUpdated { .. } => "tokens_updated",
            Self::GameReset(_) => "game_reset",
            Self::Error { .. } => "error",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
