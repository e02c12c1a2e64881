//! `BoardServer` builder and accept loop.
//!
//! This is the entry point for running a boardsync server. It ties the
//! layers together: transport → protocol → session → state.

use std::sync::Arc;

use boardsync_protocol::{Codec, JsonCodec};
use boardsync_session::{Authenticator, Broadcaster};
use boardsync_state::{StateHandle, StateStore, StoreConfig};
use boardsync_transport::{TcpTransport, Transport, TransportError, WebSocketTransport};

use crate::handler::handle_connection;
use crate::BoardsyncError;

/// Default bind address when none is given.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5555";

/// Shared server state passed to each connection task.
pub(crate) struct ServerState<A: Authenticator, C: Codec> {
    pub(crate) auth: A,
    pub(crate) broadcaster: Broadcaster<C>,
    pub(crate) store: StateHandle,
}

/// Builder for configuring and starting a boardsync server.
///
/// # Example
///
/// ```rust,no_run
/// use boardsync::prelude::*;
///
/// # async fn start() -> Result<(), BoardsyncError> {
/// let server = BoardServer::builder()
///     .bind("0.0.0.0:5555")
///     .build_websocket(SharedSecret::new("letmein"))
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct BoardServerBuilder {
    bind_addr: String,
    store_config: StoreConfig,
}

impl BoardServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            store_config: StoreConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the state store configuration (dice seed, channel size).
    pub fn store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = config;
        self
    }

    /// Binds a WebSocket listener and starts the state store.
    pub async fn build_websocket<A: Authenticator>(
        self,
        auth: A,
    ) -> Result<BoardServer<WebSocketTransport, A, JsonCodec>, BoardsyncError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        Ok(self.build_with(transport, auth, JsonCodec))
    }

    /// Binds a length-prefixed TCP listener and starts the state store.
    pub async fn build_tcp<A: Authenticator>(
        self,
        auth: A,
    ) -> Result<BoardServer<TcpTransport, A, JsonCodec>, BoardsyncError> {
        let transport = TcpTransport::bind(&self.bind_addr).await?;
        Ok(self.build_with(transport, auth, JsonCodec))
    }

    /// Starts the state store over an already bound transport.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build_with<T, A, C>(self, transport: T, auth: A, codec: C) -> BoardServer<T, A, C>
    where
        T: Transport,
        A: Authenticator,
        C: Codec,
    {
        let broadcaster = Broadcaster::with_codec(codec);
        let store = StateStore::spawn(self.store_config, broadcaster.clone());

        let state = Arc::new(ServerState {
            auth,
            broadcaster,
            store,
        });

        BoardServer { transport, state }
    }
}

impl Default for BoardServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound boardsync server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BoardServer<T: Transport, A: Authenticator, C: Codec> {
    transport: T,
    state: Arc<ServerState<A, C>>,
}

impl BoardServer<WebSocketTransport, boardsync_session::OpenAccess, JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> BoardServerBuilder {
        BoardServerBuilder::new()
    }
}

impl<T, A, C> BoardServer<T, A, C>
where
    T: Transport,
    A: Authenticator,
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the state store, for embedding and tests.
    pub fn state(&self) -> StateHandle {
        self.state.store.clone()
    }

    /// Runs the accept loop.
    ///
    /// Spawns one handler task per accepted connection. A failed accept
    /// is logged and the loop carries on. Returns once the transport
    /// stops accepting connections.
    pub async fn run(mut self) -> Result<(), BoardsyncError> {
        tracing::info!(
            addr = ?self.transport.local_addr().ok(),
            auth_required = self.state.auth.is_required(),
            "boardsync server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(TransportError::Shutdown) => {
                    tracing::info!("transport stopped, accept loop exiting");
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
