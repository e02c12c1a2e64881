//! Error types for the protocol layer.
//!
//! Each boardsync crate defines its own error enum. A `ProtocolError`
//! always means the problem is in turning messages into bytes or bytes
//! back into messages, never in networking or game state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Covers malformed JSON, unknown message tags, missing or extra
    /// fields, wrongly typed values and out-of-range collections
    /// (e.g. a roll history longer than its cap).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but violates a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
