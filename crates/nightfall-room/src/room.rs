//! Room actor: an isolated Tokio task owning one room's members and game.
//!
//! Each room runs in its own task, reached only through an mpsc channel.
//! The actor owns the member list and the [`Engine`]; nothing else can
//! touch them, so membership and game mutations for one room can never
//! interleave. Members are kept in join order and broadcasts iterate that
//! order, which keeps delivery deterministic.

use tokio::sync::{mpsc, oneshot};

use crate::RoomError;
use nightfall_engine::{Engine, Role};
use nightfall_protocol::{Phase, PlayerId, RoomId, Update};

/// Channel sender for delivering [`Update`]s to one connection.
pub type UpdateSender = mpsc::UnboundedSender<Update>;

/// Game operations routed through a room, attributed to a member.
#[derive(Debug, Clone)]
pub enum GameCommand {
    /// Assign this role list and begin the first night.
    Start { roles: Vec<Role> },
    /// Perform the sender's role-specific night action on a target.
    NightAction { target: PlayerId },
    /// Resolve the night and advance to day.
    EndNight,
    /// Advance from day into the next night.
    BeginNight,
}

/// What a leave did, so the registry can drop empty rooms.
#[derive(Debug, Clone, Copy)]
pub struct LeaveOutcome {
    /// Whether the player was actually a member.
    pub removed: bool,
    /// Whether the room is now empty and should be deleted.
    pub empty: bool,
}

/// A snapshot of room metadata, for diagnostics and tests.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub phase: Phase,
    /// Member ids in join order.
    pub members: Vec<PlayerId>,
}

/// Commands sent to a room actor through its channel. Reply channels are
/// oneshots; fire-and-forget commands answer the sender with an
/// [`Update::Rejected`] on failure instead.
pub(crate) enum RoomCommand {
    Join {
        player: PlayerId,
        sender: UpdateSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        player: PlayerId,
        reply: oneshot::Sender<LeaveOutcome>,
    },
    Game {
        player: PlayerId,
        cmd: GameCommand,
    },
    Info {
        reply: oneshot::Sender<RoomInfo>,
    },
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Sends a join request and waits for the room's verdict.
    pub async fn join(
        &self,
        player: PlayerId,
        sender: UpdateSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// Sends a leave request. Leaving as a non-member is a no-op the
    /// outcome reports rather than an error.
    pub async fn leave(&self, player: PlayerId) -> Result<LeaveOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Routes a game command from a member (fire-and-forget; failures go
    /// back to that member as a rejection update).
    pub async fn game(
        &self,
        player: PlayerId,
        cmd: GameCommand,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Game { player, cmd })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Requests the room's current metadata.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// One member: identity plus the channel its connection listens on.
struct Member {
    id: PlayerId,
    sender: UpdateSender,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    /// Join order is broadcast order.
    members: Vec<Member>,
    engine: Engine,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room created");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player, reply } => {
                    let outcome = self.handle_leave(player);
                    let _ = reply.send(outcome);
                    if outcome.empty {
                        break;
                    }
                }
                RoomCommand::Game { player, cmd } => {
                    self.handle_game(player, cmd);
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room destroyed");
    }

    fn handle_join(
        &mut self,
        player: PlayerId,
        sender: UpdateSender,
    ) -> Result<(), RoomError> {
        if let Some(member) = self.members.iter_mut().find(|m| m.id == player) {
            // Duplicate join: refresh the outbound channel so the newest
            // connection receives broadcasts, but change nothing else.
            member.sender = sender;
            tracing::debug!(room_id = %self.room_id, %player, "already in room");
            return Ok(());
        }

        if self
            .engine
            .add_player(player.clone())
            .is_err()
        {
            return Err(RoomError::GameInProgress(self.room_id.clone()));
        }

        self.members.push(Member {
            id: player.clone(),
            sender,
        });
        tracing::info!(
            room_id = %self.room_id,
            %player,
            members = self.members.len(),
            "player joined"
        );

        self.broadcast_status(format!(
            "Player {player} joined room {}",
            self.room_id
        ));
        self.broadcast_members();
        Ok(())
    }

    fn handle_leave(&mut self, player: PlayerId) -> LeaveOutcome {
        let Some(pos) = self.members.iter().position(|m| m.id == player) else {
            tracing::debug!(room_id = %self.room_id, %player, "not in room");
            return LeaveOutcome {
                removed: false,
                empty: false,
            };
        };

        self.members.remove(pos);
        self.engine.remove_player(&player);
        tracing::info!(
            room_id = %self.room_id,
            %player,
            members = self.members.len(),
            "player left"
        );

        if !self.members.is_empty() {
            self.broadcast_status(format!(
                "Player {player} left room {}",
                self.room_id
            ));
            self.broadcast_members();
        }

        LeaveOutcome {
            removed: true,
            empty: self.members.is_empty(),
        }
    }

    fn handle_game(&mut self, player: PlayerId, cmd: GameCommand) {
        if !self.members.iter().any(|m| m.id == player) {
            tracing::warn!(
                room_id = %self.room_id,
                %player,
                "game command from non-member, ignoring"
            );
            return;
        }

        let result = match cmd {
            GameCommand::Start { roles } => self.start_game(roles),
            GameCommand::NightAction { target } => self.night_action(&player, &target),
            GameCommand::EndNight => self.end_night(),
            GameCommand::BeginNight => self.begin_night(),
        };

        // Errors are local to the triggering member; nobody else hears
        // about them.
        if let Err(reason) = result {
            tracing::debug!(
                room_id = %self.room_id,
                %player,
                %reason,
                "game command rejected"
            );
            self.send_to(&player, Update::Rejected { reason });
        }
    }

    fn start_game(&mut self, roles: Vec<Role>) -> Result<(), String> {
        self.engine
            .assign_roles(roles)
            .map_err(|e| e.to_string())?;
        self.engine.begin_night().map_err(|e| e.to_string())?;

        tracing::info!(
            room_id = %self.room_id,
            players = self.engine.player_count(),
            "game started"
        );
        self.broadcast_status(format!("The game in room {} begins", self.room_id));
        self.broadcast_phase();
        self.broadcast_members();
        Ok(())
    }

    fn night_action(&mut self, actor: &PlayerId, target: &PlayerId) -> Result<(), String> {
        let role = self
            .engine
            .role_of(actor)
            .ok_or_else(|| format!("{actor} has no role"))?;
        role.night_action(&mut self.engine, target)
            .map_err(|e| e.to_string())?;
        self.broadcast_members();
        Ok(())
    }

    fn end_night(&mut self) -> Result<(), String> {
        self.engine.resolve_night().map_err(|e| e.to_string())?;
        self.broadcast_status(format!("Day breaks over room {}", self.room_id));
        self.broadcast_phase();
        self.broadcast_members();
        Ok(())
    }

    fn begin_night(&mut self) -> Result<(), String> {
        self.engine.begin_night().map_err(|e| e.to_string())?;
        self.broadcast_status(format!("Night falls over room {}", self.room_id));
        self.broadcast_phase();
        self.broadcast_members();
        Ok(())
    }

    /// Sends the same status line to every member, in join order.
    fn broadcast_status(&self, message: String) {
        for member in &self.members {
            let _ = member.sender.send(Update::Status {
                message: message.clone(),
            });
        }
    }

    /// Sends each member their own redacted view of the room.
    fn broadcast_members(&self) {
        for member in &self.members {
            let _ = member.sender.send(Update::Members {
                room_id: self.room_id.clone(),
                players: self.engine.snapshot_for(&member.id),
            });
        }
    }

    fn broadcast_phase(&self) {
        for member in &self.members {
            let _ = member.sender.send(Update::Phase {
                room_id: self.room_id.clone(),
                phase: self.engine.phase(),
            });
        }
    }

    /// Sends an update to a single member. Silently drops if the
    /// receiver is gone (connection already closed).
    fn send_to(&self, player: &PlayerId, update: Update) {
        if let Some(member) = self.members.iter().find(|m| &m.id == player) {
            let _ = member.sender.send(update);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            phase: self.engine.phase(),
            members: self.members.iter().map(|m| m.id.clone()).collect(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// `channel_size` bounds the command channel; senders wait when it fills.
pub(crate) fn spawn_room(room_id: RoomId, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room_id: room_id.clone(),
        members: Vec::new(),
        engine: Engine::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
