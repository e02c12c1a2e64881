//! Per-connection lifecycle.
//!
//! Every accepted connection walks the same state machine:
//!
//! ```text
//!   Connecting ──(gated)──→ AwaitingAuth ──(auth ok)──→ Active ──→ Closed
//!       │                        │                                   ↑
//!       └──────(ungated)─────────┼───────────→ Active                │
//!                                └───────────(read/decode error)─────┘
//! ```
//!
//! - **Connecting**: accepted, nothing decided yet.
//! - **AwaitingAuth**: password-gated server, no valid `auth` seen. Only
//!   read-only messages are allowed; the connection is not registered and
//!   receives no broadcasts.
//! - **Active**: registered, receives every broadcast, may mutate.
//! - **Closed**: terminal. Deregistered, never reused.

use std::fmt;

use boardsync_protocol::ClientMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    AwaitingAuth,
    Active,
    Closed,
}

impl ConnectionState {
    /// The state a freshly accepted connection moves to once the gate
    /// policy is known.
    pub fn opened(auth_required: bool) -> Self {
        if auth_required {
            Self::AwaitingAuth
        } else {
            Self::Active
        }
    }

    /// Returns `true` if a transition from `self` to `target` is allowed.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Connecting, Self::AwaitingAuth)
                | (Self::Connecting, Self::Active)
                | (Self::AwaitingAuth, Self::Active)
                | (Self::Connecting, Self::Closed)
                | (Self::AwaitingAuth, Self::Closed)
                | (Self::Active, Self::Closed)
        )
    }

    /// Whether a message may be processed in this state.
    ///
    /// Before authentication only `auth`, `request_state` and
    /// `disconnect` are served.
    pub fn permits(self, msg: &ClientMessage) -> bool {
        match self {
            Self::Active => true,
            Self::AwaitingAuth => !msg.is_mutating(),
            Self::Connecting | Self::Closed => false,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "Connecting"),
            Self::AwaitingAuth => write!(f, "AwaitingAuth"),
            Self::Active => write!(f, "Active"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opened_gated_awaits_auth() {
        assert_eq!(ConnectionState::opened(true), ConnectionState::AwaitingAuth);
        assert_eq!(ConnectionState::opened(false), ConnectionState::Active);
    }

    #[test]
    fn test_can_transition_to_follows_lifecycle() {
        use ConnectionState::*;
        assert!(Connecting.can_transition_to(AwaitingAuth));
        assert!(AwaitingAuth.can_transition_to(Active));
        assert!(Active.can_transition_to(Closed));
        assert!(!Active.can_transition_to(AwaitingAuth));
        assert!(!Closed.can_transition_to(Active));
        assert!(!Closed.can_transition_to(Connecting));
    }

    #[test]
    fn test_permits_awaiting_auth_blocks_mutations() {
        let state = ConnectionState::AwaitingAuth;
        assert!(state.permits(&ClientMessage::Auth {
            password: "x".into()
        }));
        assert!(state.permits(&ClientMessage::RequestState {}));
        assert!(state.permits(&ClientMessage::Disconnect {}));
        assert!(!state.permits(&ClientMessage::Roll {}));
        assert!(!state.permits(&ClientMessage::Reset {}));
        assert!(!state.permits(&ClientMessage::Move {
            token_id: "red-0".into(),
            x: 1.0,
            y: 1.0,
        }));
    }

    #[test]
    fn test_permits_active_allows_everything() {
        let state = ConnectionState::Active;
        assert!(state.permits(&ClientMessage::Roll {}));
        assert!(state.permits(&ClientMessage::Reset {}));
    }

    #[test]
    fn test_permits_closed_allows_nothing() {
        assert!(!ConnectionState::Closed.permits(&ClientMessage::RequestState {}));
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionState::AwaitingAuth.to_string(), "AwaitingAuth");
    }
}
