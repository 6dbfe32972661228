//! Room actor: an isolated Tokio task that owns one simulation.
//!
//! Each room runs in its own task, communicating with connection
//! handlers through an mpsc channel — no shared mutable state, just
//! message passing. The tick driver is a permanent branch of the
//! actor's `select!` loop; it is idle in the lobby, started when the
//! round starts, and stopped again when it ends.

use std::collections::HashMap;

use gridsnake_game::{GameConfig, JoinError, RoomSim, SimEvent, epoch_ms};
use gridsnake_protocol::{Dir, PlayerId, RoomCode, RoundPhase, ServerMessage};
use gridsnake_tick::TickDriver;
use tokio::sync::{mpsc, oneshot};

use crate::RoomError;

/// Channel sender for delivering server messages to one player's
/// connection handler.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its channel.
///
/// Variants with a `oneshot::Sender` are request/reply; the rest are
/// fire-and-forget.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        color: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<usize>,
    },
    Start,
    Input {
        player_id: PlayerId,
        dir: Dir,
        seq: u64,
    },
    Shutdown,
}

/// Handle to a running room actor. Cheap to clone — an `mpsc::Sender`
/// wrapper plus the room code.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Adds a player to the room and registers its outbound channel.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: String,
        color: String,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                name,
                color,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Removes a player. Returns the remaining member count so the
    /// caller can destroy a room it just emptied.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Requests a round start (fire-and-forget; a no-op once running).
    pub async fn start(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Start)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Buffers a direction input (fire-and-forget, latest wins).
    pub async fn input(&self, player_id: PlayerId, dir: Dir, seq: u64) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Input {
                player_id,
                dir,
                seq,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    code: RoomCode,
    sim: RoomSim,
    senders: HashMap<PlayerId, PlayerSender>,
    driver: TickDriver,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.code, "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    match cmd {
                        Some(RoomCommand::Join { player_id, name, color, sender, reply }) => {
                            let result = self.handle_join(player_id, name, color, sender);
                            let _ = reply.send(result);
                        }
                        Some(RoomCommand::Leave { player_id, reply }) => {
                            let _ = reply.send(self.handle_leave(player_id));
                        }
                        Some(RoomCommand::Start) => self.handle_start(),
                        Some(RoomCommand::Input { player_id, dir, seq }) => {
                            self.sim.buffer_input(player_id, dir, seq);
                        }
                        Some(RoomCommand::Shutdown) | None => break,
                    }
                }
                _ = self.driver.wait_for_tick() => {
                    self.handle_tick();
                }
            }
        }

        tracing::info!(room = %self.code, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: String,
        color: String,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        self.sim
            .add_player(player_id, name, color)
            .map_err(|e| match e {
                JoinError::Full => RoomError::RoomFull(self.code.clone()),
                JoinError::Started => RoomError::RoundStarted(self.code.clone()),
            })?;
        self.senders.insert(player_id, sender);
        tracing::info!(
            room = %self.code,
            player = %player_id,
            players = self.sim.player_count(),
            "player joined"
        );

        // The joiner learns its own id first, then everyone (joiner
        // included) gets the updated roster.
        let room = self.sim.room_snapshot(&self.code);
        self.send_to(
            player_id,
            ServerMessage::Joined {
                you: player_id,
                room: room.clone(),
            },
        );
        self.broadcast(ServerMessage::Players { room });
        Ok(())
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> usize {
        let remaining = self.sim.remove_player(player_id);
        self.senders.remove(&player_id);
        tracing::info!(
            room = %self.code,
            player = %player_id,
            players = remaining,
            "player left"
        );
        if remaining > 0 {
            let room = self.sim.room_snapshot(&self.code);
            self.broadcast(ServerMessage::Players { room });
        }
        remaining
    }

    fn handle_start(&mut self) {
        if !self.sim.start(epoch_ms()) {
            tracing::debug!(room = %self.code, phase = %self.sim.phase(), "start ignored");
            return;
        }
        self.driver.start();
        tracing::info!(
            room = %self.code,
            players = self.sim.player_count(),
            "round started"
        );
        let room = self.sim.room_snapshot(&self.code);
        self.broadcast(ServerMessage::Room { room });
    }

    fn handle_tick(&mut self) {
        let now = epoch_ms();
        for event in self.sim.tick(now) {
            match event {
                SimEvent::Death {
                    id,
                    reason,
                    respawn_at,
                } => self.broadcast(ServerMessage::Death {
                    id,
                    reason,
                    respawn_at,
                }),
                SimEvent::Respawn { id, body, dir } => {
                    self.broadcast(ServerMessage::Respawn { id, body, dir });
                }
                SimEvent::Ended => {
                    self.driver.stop();
                    let room = self.sim.room_snapshot(&self.code);
                    tracing::info!(room = %self.code, "round ended");
                    self.broadcast(ServerMessage::Ended { room });
                }
            }
        }

        // No state snapshot after `ended` — it is the final broadcast.
        if self.sim.phase() == RoundPhase::Running {
            self.broadcast(ServerMessage::State {
                t: now,
                tick: self.sim.tick_count(),
                food: self.sim.food(),
                players: self.sim.player_snapshots(),
            });
        }
    }

    fn broadcast(&self, msg: ServerMessage) {
        for sender in self.senders.values() {
            let _ = sender.send(msg.clone());
        }
    }

    /// Sends to a single player. Silently drops if the receiver is gone
    /// (connection already closed).
    fn send_to(&self, player_id: PlayerId, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// `channel_size` bounds the command channel — if it fills up, senders
/// wait.
pub(crate) fn spawn_room(code: RoomCode, config: GameConfig, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let driver = TickDriver::new(config.tick_hz);
    let actor = RoomActor {
        code: code.clone(),
        sim: RoomSim::new(config),
        senders: HashMap::new(),
        driver,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
