//! Error types for the state layer.

/// Errors returned by [`StateHandle`](crate::StateHandle) calls.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The store actor has stopped (shutdown, or its task ended), so the
    /// command could not be delivered or was never answered.
    #[error("state store is unavailable")]
    Unavailable,
}
