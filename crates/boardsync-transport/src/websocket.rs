//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, Transport, TransportError};

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// How long a peer has to complete the WebSocket upgrade.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Upgraded connections waiting for [`Transport::accept`].
const READY_QUEUE: usize = 64;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
///
/// A background acceptor takes TCP connections and runs each upgrade
/// handshake in its own task, so a peer that never finishes its upgrade
/// cannot hold up anyone else. Only upgraded connections reach
/// [`accept`](Transport::accept).
pub struct WebSocketTransport {
    local_addr: SocketAddr,
    ready: mpsc::Receiver<WebSocketConnection>,
    acceptor: JoinHandle<()>,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        Self::bind_with_timeout(addr, HANDSHAKE_TIMEOUT).await
    }

    /// Like [`bind`](Self::bind), with a custom upgrade deadline.
    pub async fn bind_with_timeout(
        addr: &str,
        handshake_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        let local_addr = listener.local_addr().map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");

        let (tx, ready) = mpsc::channel(READY_QUEUE);
        let acceptor = tokio::spawn(accept_loop(listener, handshake_timeout, tx));

        Ok(Self {
            local_addr,
            ready,
            acceptor,
        })
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.acceptor.abort();
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;

    async fn accept(&mut self) -> Result<Self::Connection, TransportError> {
        self.ready.recv().await.ok_or(TransportError::Shutdown)
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        Ok(self.local_addr)
    }
}

async fn accept_loop(
    listener: TcpListener,
    handshake_timeout: Duration,
    ready: mpsc::Sender<WebSocketConnection>,
) {
    loop {
        let (stream, addr) = tokio::select! {
            _ = ready.closed() => break,
            accepted = listener.accept() => match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                    continue;
                }
            },
        };

        let ready = ready.clone();
        tokio::spawn(async move {
            let ws = match tokio::time::timeout(
                handshake_timeout,
                tokio_tungstenite::accept_async(stream),
            )
            .await
            {
                Ok(Ok(ws)) => ws,
                Ok(Err(e)) => {
                    tracing::debug!(%addr, error = %e, "WebSocket handshake failed");
                    return;
                }
                Err(_) => {
                    tracing::debug!(%addr, "WebSocket handshake timed out");
                    return;
                }
            };

            let id = ConnectionId::next();
            tracing::debug!(%id, %addr, "accepted WebSocket connection");

            let (sink, stream) = ws.split();
            let conn = WebSocketConnection {
                id,
                sink: Mutex::new(sink),
                stream: Mutex::new(stream),
            };
            if ready.send(conn).await.is_err() {
                tracing::debug!(%id, "transport dropped before connection was accepted");
            }
        });
    }
}

/// A single WebSocket connection.
///
/// The socket is split so that reading and writing lock separate halves.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl Connection for WebSocketConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let msg = Message::Binary(data.to_vec().into());
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
