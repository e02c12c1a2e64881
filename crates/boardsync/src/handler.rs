//! Per-connection handler: auth gate and message routing.
//!
//! Each accepted connection gets two Tokio tasks:
//!
//! - a **reader** (this handler) that decodes client messages, applies
//!   the auth gate and forwards intents to the state store;
//! - a **writer** that drains the connection's outbound queue onto the
//!   socket.
//!
//! Everything the client receives goes through the outbound queue,
//! including direct replies, so replies and broadcasts reach the socket
//! in the order they were queued.

use std::sync::Arc;

use boardsync_protocol::{ClientMessage, Codec, ProtocolError, ServerMessage};
use boardsync_session::{Authenticator, ConnectionState, Frame, Outbound};
use boardsync_state::StateHandle;
use boardsync_transport::{Connection, ConnectionId};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::BoardsyncError;

/// Status code for a message that failed to decode.
pub const ERROR_MALFORMED: u16 = 400;

/// Status code for a mutating message sent before authenticating.
pub const ERROR_UNAUTHENTICATED: u16 = 401;

/// Drop guard that removes the connection from the registry when the
/// handler exits, including by panic. `Drop` is synchronous, so the
/// async deregistration is spawned.
struct RegistrationGuard {
    id: ConnectionId,
    store: StateHandle,
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        let id = self.id;
        let store = self.store.clone();
        tokio::spawn(async move {
            let _ = store.leave(id).await;
        });
    }
}

/// What the reader loop does after handling one message.
enum Flow {
    Continue,
    Close,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<N, A, C>(
    conn: N,
    state: Arc<ServerState<A, C>>,
) -> Result<(), BoardsyncError>
where
    N: Connection,
    A: Authenticator,
    C: Codec,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (outbound, rx) = Outbound::channel(conn_id);
    tokio::spawn(run_writer(Arc::clone(&conn), rx));
    let _guard = RegistrationGuard {
        id: conn_id,
        store: state.store.clone(),
    };

    let mut session = ConnectionState::Connecting;
    let opened = ConnectionState::opened(state.auth.is_required());
    debug_assert!(session.can_transition_to(opened));
    session = opened;

    if session.is_active() {
        state.store.join(outbound.clone()).await?;
        tracing::info!(%conn_id, "connection active");
    }

    let result = read_loop(conn.as_ref(), &state, &outbound, &mut session).await;

    session = ConnectionState::Closed;
    tracing::info!(%conn_id, %session, "connection closed");

    // `_guard` drops here and deregisters. Once the registry's copy of
    // `outbound` is gone too, the writer flushes what is queued and
    // closes the socket.
    result
}

async fn read_loop<N, A, C>(
    conn: &N,
    state: &ServerState<A, C>,
    outbound: &Outbound,
    session: &mut ConnectionState,
) -> Result<(), BoardsyncError>
where
    N: Connection,
    A: Authenticator,
    C: Codec,
{
    let conn_id = conn.id();

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "peer closed connection");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                return Ok(());
            }
        };

        let msg: ClientMessage = match state.broadcaster.codec().decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "malformed message, closing");
                let reply = ServerMessage::Error {
                    code: ERROR_MALFORMED,
                    message: e.to_string(),
                };
                // Best effort: the connection is closing either way.
                let _ = state.broadcaster.send_to(outbound, &reply);
                return Err(e.into());
            }
        };

        tracing::debug!(%conn_id, kind = msg.kind(), %session, "received");

        if !session.permits(&msg) {
            let err = ProtocolError::InvalidMessage(format!(
                "{} requires authentication",
                msg.kind()
            ));
            tracing::warn!(%conn_id, error = %err, "rejected before auth");
            state.broadcaster.send_to(
                outbound,
                &ServerMessage::Error {
                    code: ERROR_UNAUTHENTICATED,
                    message: err.to_string(),
                },
            )?;
            continue;
        }

        if let Flow::Close = dispatch(msg, state, outbound, session).await? {
            tracing::debug!(%conn_id, "client requested disconnect");
            return Ok(());
        }
    }
}

/// Routes one permitted message.
async fn dispatch<A, C>(
    msg: ClientMessage,
    state: &ServerState<A, C>,
    outbound: &Outbound,
    session: &mut ConnectionState,
) -> Result<Flow, BoardsyncError>
where
    A: Authenticator,
    C: Codec,
{
    match msg {
        ClientMessage::Auth { password } => {
            handle_auth(&password, state, outbound, session).await?;
        }
        ClientMessage::RequestState {} => {
            state.store.send_snapshot(outbound.clone()).await?;
        }
        ClientMessage::Roll {} => {
            state.store.roll_dice().await?;
        }
        ClientMessage::Move { token_id, x, y } => {
            state.store.move_token(token_id, x, y).await?;
        }
        ClientMessage::Reset {} => {
            state.store.reset().await?;
        }
        ClientMessage::Disconnect {} => return Ok(Flow::Close),
    }
    Ok(Flow::Continue)
}

/// Checks a password and, on success, activates the connection.
///
/// A wrong password is answered and otherwise ignored: the connection
/// stays open and unregistered so the client can try again.
async fn handle_auth<A, C>(
    password: &str,
    state: &ServerState<A, C>,
    outbound: &Outbound,
    session: &mut ConnectionState,
) -> Result<(), BoardsyncError>
where
    A: Authenticator,
    C: Codec,
{
    let conn_id = outbound.id();

    if session.is_active() {
        state
            .broadcaster
            .send_to(outbound, &ServerMessage::AuthResult { success: true })?;
        return Ok(());
    }

    match state.auth.authenticate(password).await {
        Ok(()) => {
            state
                .broadcaster
                .send_to(outbound, &ServerMessage::AuthResult { success: true })?;
            state.store.join(outbound.clone()).await?;
            *session = ConnectionState::Active;
            tracing::info!(%conn_id, "connection authenticated");
        }
        Err(e) => {
            tracing::info!(%conn_id, error = %e, "authentication failed");
            state
                .broadcaster
                .send_to(outbound, &ServerMessage::AuthResult { success: false })?;
        }
    }
    Ok(())
}

/// Drains `rx` onto the socket until the queue closes or a send fails,
/// then closes the connection.
async fn run_writer<N: Connection>(conn: Arc<N>, mut rx: mpsc::UnboundedReceiver<Frame>) {
    let conn_id = conn.id();

    while let Some(frame) = rx.recv().await {
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }

    // Dropping `rx` closes the queue; the next broadcast prunes this
    // connection if it is still registered.
    drop(rx);
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }
}
