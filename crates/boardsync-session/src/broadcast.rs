//! Encode-once fan-out of server messages.
//!
//! A [`Broadcaster`] pairs the shared registry with a codec. Each
//! broadcast encodes its message exactly once into a [`Frame`] and pushes
//! that same frame into every registered connection's queue while holding
//! the registry lock.

use std::sync::Arc;

use boardsync_protocol::{Codec, ServerMessage};

use crate::{BroadcastReport, ConnectionRegistry, Frame, Outbound, SessionError, SharedRegistry};

pub struct Broadcaster<C: Codec> {
    registry: SharedRegistry,
    codec: Arc<C>,
}

// Manual impl: `C` itself need not be `Clone`.
impl<C: Codec> Clone for Broadcaster<C> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<C: Codec> Broadcaster<C> {
    pub fn new(registry: SharedRegistry, codec: Arc<C>) -> Self {
        Self { registry, codec }
    }

    /// Creates a broadcaster over a fresh, empty registry.
    pub fn with_codec(codec: C) -> Self {
        Self::new(ConnectionRegistry::shared(), Arc::new(codec))
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn codec(&self) -> &Arc<C> {
        &self.codec
    }

    /// Encodes `msg` into a shareable frame.
    pub fn encode(&self, msg: &ServerMessage) -> Result<Frame, SessionError> {
        let bytes = self.codec.encode(msg)?;
        Ok(Frame::from(bytes))
    }

    /// Sends `msg` to every registered connection.
    ///
    /// Dead connections are pruned as a side effect and never fail the
    /// broadcast as a whole.
    ///
    /// # Errors
    /// Only if `msg` cannot be encoded, in which case nobody receives it.
    pub async fn broadcast(&self, msg: &ServerMessage) -> Result<BroadcastReport, SessionError> {
        let frame = self.encode(msg)?;
        let report = self.registry.lock().await.broadcast(&frame);

        tracing::debug!(
            kind = msg.kind(),
            delivered = report.delivered,
            pruned = report.pruned.len(),
            "broadcast"
        );
        Ok(report)
    }

    /// Sends `msg` to one connection only.
    pub fn send_to(&self, outbound: &Outbound, msg: &ServerMessage) -> Result<(), SessionError> {
        outbound.send(self.encode(msg)?)
    }
}

#[cfg(test)]
mod tests {
    use boardsync_protocol::JsonCodec;
    use boardsync_transport::ConnectionId;

    use super::*;

    fn reset_msg() -> ServerMessage {
        ServerMessage::TokensUpdated {
            tokens: Vec::new(),
            move_count: 7,
        }
    }

    #[tokio::test]
    async fn test_broadcast_empty_registry_delivers_nothing() {
        let broadcaster = Broadcaster::with_codec(JsonCodec);
        let report = broadcaster.broadcast(&reset_msg()).await.unwrap();
        assert_eq!(report, BroadcastReport::default());
    }

    #[tokio::test]
    async fn test_broadcast_sends_encoded_message_to_all() {
        let broadcaster = Broadcaster::with_codec(JsonCodec);
        let (a, mut ra) = Outbound::channel(ConnectionId::new(1));
        let (b, mut rb) = Outbound::channel(ConnectionId::new(2));
        {
            let mut registry = broadcaster.registry().lock().await;
            registry.register(a);
            registry.register(b);
        }

        let report = broadcaster.broadcast(&reset_msg()).await.unwrap();
        assert_eq!(report.delivered, 2);

        let frame_a = ra.recv().await.unwrap();
        let frame_b = rb.recv().await.unwrap();
        let decoded: ServerMessage = JsonCodec.decode(&frame_a).unwrap();
        assert_eq!(decoded, reset_msg());
        assert_eq!(frame_a, frame_b);
    }

    #[tokio::test]
    async fn test_broadcast_prunes_closed_queue() {
        let broadcaster = Broadcaster::with_codec(JsonCodec);
        let (a, rx) = Outbound::channel(ConnectionId::new(3));
        broadcaster.registry().lock().await.register(a);
        drop(rx);

        let report = broadcaster.broadcast(&reset_msg()).await.unwrap();
        assert_eq!(report.delivered, 0);
        assert_eq!(report.pruned, vec![ConnectionId::new(3)]);
        assert!(broadcaster.registry().lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_send_to_reaches_only_target() {
        let broadcaster = Broadcaster::with_codec(JsonCodec);
        let (a, mut ra) = Outbound::channel(ConnectionId::new(1));
        let (b, mut rb) = Outbound::channel(ConnectionId::new(2));
        broadcaster.registry().lock().await.register(b.clone());

        broadcaster
            .send_to(&a, &ServerMessage::AuthResult { success: false })
            .unwrap();

        let decoded: ServerMessage = JsonCodec.decode(&ra.recv().await.unwrap()).unwrap();
        assert_eq!(decoded, ServerMessage::AuthResult { success: false });
        assert!(rb.try_recv().is_err());
    }

    #[test]
    fn test_clone_shares_registry() {
        let broadcaster = Broadcaster::with_codec(JsonCodec);
        let cloned = broadcaster.clone();
        assert!(Arc::ptr_eq(broadcaster.registry(), cloned.registry()));
    }
}
