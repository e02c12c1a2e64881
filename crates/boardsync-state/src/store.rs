//! State store actor: the single owner of the authoritative game state.
//!
//! The store runs in its own Tokio task and is reached only through a
//! [`StateHandle`]. Commands arrive over a bounded mpsc channel and are
//! applied one at a time, so there is exactly one writer and no lock
//! around the game state.
//!
//! Every mutation is broadcast from inside the actor, before the caller
//! gets its reply. Because only the actor broadcasts, all clients see
//! deltas in the same order the mutations happened. Joins and snapshot
//! requests are also commands, so a snapshot lands in a connection's
//! queue exactly between the deltas that precede and follow it.

use boardsync_protocol::{Codec, GameState, ServerMessage};
use boardsync_session::{Broadcaster, Outbound};
use boardsync_transport::ConnectionId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};

use crate::{StateError, StoreConfig, dice, layout, rules};

/// Commands sent to the store actor through its channel.
///
/// Variants carrying a `oneshot::Sender` expect a reply; the caller
/// waits on it.
enum StoreCommand {
    Roll {
        reply: oneshot::Sender<ServerMessage>,
    },

    Move {
        token_id: String,
        x: f64,
        y: f64,
        reply: oneshot::Sender<ServerMessage>,
    },

    Reset {
        reply: oneshot::Sender<ServerMessage>,
    },

    Snapshot {
        reply: oneshot::Sender<GameState>,
    },

    /// Register a connection and queue its first snapshot.
    Join {
        outbound: Outbound,
        reply: oneshot::Sender<()>,
    },

    /// Queue a snapshot for one connection without registering it.
    SendSnapshot {
        outbound: Outbound,
        reply: oneshot::Sender<()>,
    },

    /// Remove a connection from the registry. No reply.
    Leave { id: ConnectionId },

    Shutdown,
}

/// Handle to the running store. Cheap to clone; every connection task
/// holds one.
#[derive(Clone)]
pub struct StateHandle {
    sender: mpsc::Sender<StoreCommand>,
}

impl StateHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> StoreCommand,
    ) -> Result<T, StateError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| StateError::Unavailable)?;
        reply_rx.await.map_err(|_| StateError::Unavailable)
    }

    /// Throws the dice. Returns the `dice_rolled` message that was
    /// broadcast.
    pub async fn roll_dice(&self) -> Result<ServerMessage, StateError> {
        self.request(|reply| StoreCommand::Roll { reply }).await
    }

    /// Moves one token. Returns the `tokens_updated` message that was
    /// broadcast.
    pub async fn move_token(
        &self,
        token_id: impl Into<String>,
        x: f64,
        y: f64,
    ) -> Result<ServerMessage, StateError> {
        let token_id = token_id.into();
        self.request(|reply| StoreCommand::Move {
            token_id,
            x,
            y,
            reply,
        })
        .await
    }

    /// Restores the starting board. Returns the `game_reset` message
    /// that was broadcast.
    pub async fn reset(&self) -> Result<ServerMessage, StateError> {
        self.request(|reply| StoreCommand::Reset { reply }).await
    }

    /// A point-in-time copy of the whole game state.
    pub async fn snapshot(&self) -> Result<GameState, StateError> {
        self.request(|reply| StoreCommand::Snapshot { reply }).await
    }

    /// Registers `outbound` for broadcasts and queues a `game_state`
    /// snapshot ahead of any later delta.
    pub async fn join(&self, outbound: Outbound) -> Result<(), StateError> {
        self.request(|reply| StoreCommand::Join { outbound, reply })
            .await
    }

    /// Queues a `game_state` snapshot for one connection.
    pub async fn send_snapshot(&self, outbound: Outbound) -> Result<(), StateError> {
        self.request(|reply| StoreCommand::SendSnapshot { outbound, reply })
            .await
    }

    /// Deregisters a connection.
    pub async fn leave(&self, id: ConnectionId) -> Result<(), StateError> {
        self.sender
            .send(StoreCommand::Leave { id })
            .await
            .map_err(|_| StateError::Unavailable)
    }

    /// Stops the actor. Later calls on any handle return
    /// [`StateError::Unavailable`].
    pub async fn shutdown(&self) -> Result<(), StateError> {
        self.sender
            .send(StoreCommand::Shutdown)
            .await
            .map_err(|_| StateError::Unavailable)
    }
}

/// The actor itself. Lives inside its Tokio task.
pub struct StateStore<C: Codec> {
    state: GameState,
    rng: StdRng,
    broadcaster: Broadcaster<C>,
    receiver: mpsc::Receiver<StoreCommand>,
}

impl<C: Codec> StateStore<C> {
    /// Spawns the store on the current runtime, starting from the
    /// initial layout.
    pub fn spawn(config: StoreConfig, broadcaster: Broadcaster<C>) -> StateHandle {
        let (tx, rx) = mpsc::channel(config.channel_size.max(1));
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let actor = Self {
            state: layout::initial_state(),
            rng,
            broadcaster,
            receiver: rx,
        };
        tokio::spawn(actor.run());

        StateHandle { sender: tx }
    }

    async fn run(mut self) {
        tracing::info!("state store started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                StoreCommand::Roll { reply } => {
                    let roll = dice::roll(&mut self.rng);
                    let msg = rules::apply_roll(&mut self.state, roll);
                    tracing::debug!(score = roll.score, "dice rolled");
                    self.publish(&msg).await;
                    let _ = reply.send(msg);
                }
                StoreCommand::Move {
                    token_id,
                    x,
                    y,
                    reply,
                } => {
                    let msg = rules::apply_move(&mut self.state, &token_id, x, y);
                    tracing::debug!(
                        %token_id,
                        move_count = self.state.move_count,
                        "token moved"
                    );
                    self.publish(&msg).await;
                    let _ = reply.send(msg);
                }
                StoreCommand::Reset { reply } => {
                    let msg = rules::apply_reset(&mut self.state);
                    tracing::info!("game reset");
                    self.publish(&msg).await;
                    let _ = reply.send(msg);
                }
                StoreCommand::Snapshot { reply } => {
                    let _ = reply.send(self.state.clone());
                }
                StoreCommand::Join { outbound, reply } => {
                    self.handle_join(outbound).await;
                    let _ = reply.send(());
                }
                StoreCommand::SendSnapshot { outbound, reply } => {
                    self.send_snapshot(&outbound);
                    let _ = reply.send(());
                }
                StoreCommand::Leave { id } => {
                    self.broadcaster.registry().lock().await.deregister(id);
                }
                StoreCommand::Shutdown => {
                    tracing::info!("state store shutting down");
                    break;
                }
            }
        }

        tracing::info!("state store stopped");
    }

    async fn handle_join(&mut self, outbound: Outbound) {
        let id = outbound.id();
        self.send_snapshot(&outbound);
        let mut registry = self.broadcaster.registry().lock().await;
        registry.register(outbound);
        tracing::info!(%id, connections = registry.len(), "connection joined");
    }

    /// Queues a snapshot. A closed queue just means the connection is
    /// already going away.
    fn send_snapshot(&self, outbound: &Outbound) {
        let msg = ServerMessage::GameState(self.state.clone());
        if let Err(e) = self.broadcaster.send_to(outbound, &msg) {
            tracing::debug!(id = %outbound.id(), error = %e, "snapshot not delivered");
        }
    }

    async fn publish(&self, msg: &ServerMessage) {
        if let Err(e) = self.broadcaster.broadcast(msg).await {
            tracing::error!(kind = msg.kind(), error = %e, "broadcast failed");
        }
    }
}
