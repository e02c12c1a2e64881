//! The auth gate: deciding whether a connection may change the board.
//!
//! The server only ever checks one thing: does the client know the shared
//! secret? That check sits behind the [`Authenticator`] trait so the
//! handler doesn't care whether a deployment is password-gated
//! ([`SharedSecret`]) or open ([`OpenAccess`]), and tests can plug in
//! their own.

use std::fmt;
use std::future::Future;

use crate::SessionError;

/// Validates the secret a client presents in an `auth` message.
///
/// `Send + Sync + 'static` because a single authenticator is shared by
/// every connection task for the life of the server.
pub trait Authenticator: Send + Sync + 'static {
    /// Checks `password` against the gate.
    ///
    /// # Errors
    /// [`SessionError::AuthFailed`] if the password is rejected.
    fn authenticate(
        &self,
        password: &str,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Whether connections must authenticate before they are registered
    /// and allowed to mutate state. Default: `true`.
    fn is_required(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// SharedSecret
// ---------------------------------------------------------------------------

/// A single shared password, compared for exact equality.
#[derive(Clone)]
pub struct SharedSecret {
    secret: String,
}

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

// Never print the secret itself.
impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret").finish_non_exhaustive()
    }
}

impl Authenticator for SharedSecret {
    async fn authenticate(&self, password: &str) -> Result<(), SessionError> {
        if password == self.secret {
            Ok(())
        } else {
            Err(SessionError::AuthFailed("incorrect password".into()))
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAccess
// ---------------------------------------------------------------------------

/// No gate at all: every connection is active from the start.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

impl Authenticator for OpenAccess {
    async fn authenticate(&self, _password: &str) -> Result<(), SessionError> {
        Ok(())
    }

    fn is_required(&self) -> bool {
        false
    }
}
