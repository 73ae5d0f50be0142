//! The room registry: the process-wide map from room id to room actor.
//!
//! An explicit service object, constructed once at process start and
//! shared by reference with every gateway task — no ambient global state.
//! The map lives behind a single async mutex held across the room's
//! reply, which is what makes `join` an atomic upsert: two simultaneous
//! first-joins to the same unknown id converge on one actor, and a leave
//! that empties a room deletes it before any later join can observe it.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::room::spawn_room;
use crate::{GameCommand, RoomError, RoomHandle, RoomInfo, UpdateSender};
use nightfall_protocol::{PlayerId, RoomId};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Tracks every live room. Rooms are created on first join and removed
/// when their last member leaves; an empty registry means no games.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, RoomHandle>>,
    channel_size: usize,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::with_channel_size(DEFAULT_CHANNEL_SIZE)
    }

    pub fn with_channel_size(channel_size: usize) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            channel_size,
        }
    }

    /// Adds a player to a room, creating the room if it doesn't exist.
    ///
    /// Duplicate joins are idempotent. Fails with
    /// [`RoomError::GameInProgress`] once the room's game has started.
    pub async fn join(
        &self,
        room_id: RoomId,
        player: PlayerId,
        sender: UpdateSender,
    ) -> Result<(), RoomError> {
        let mut rooms = self.rooms.lock().await;
        let handle = rooms
            .entry(room_id.clone())
            .or_insert_with(|| spawn_room(room_id, self.channel_size));
        handle.join(player, sender).await
    }

    /// Removes a player from a room, deleting the room if it empties.
    ///
    /// An unknown room is an error for the caller to log; a known room
    /// the player never joined is a quiet no-op.
    pub async fn leave(&self, room_id: &RoomId, player: PlayerId) -> Result<(), RoomError> {
        let mut rooms = self.rooms.lock().await;
        let handle = rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let outcome = handle.leave(player).await?;
        if outcome.empty {
            rooms.remove(room_id);
            tracing::info!(%room_id, "room emptied and removed");
        }
        Ok(())
    }

    /// Routes a game command from a player to a room.
    pub async fn game(
        &self,
        room_id: &RoomId,
        player: PlayerId,
        cmd: GameCommand,
    ) -> Result<(), RoomError> {
        let rooms = self.rooms.lock().await;
        let handle = rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.game(player, cmd).await
    }

    /// Force-deletes a room, dropping its actor. No-op if absent.
    ///
    /// Normal teardown happens through [`leave`](Self::leave); this is
    /// the administrative override.
    pub async fn remove(&self, room_id: &RoomId) {
        if self.rooms.lock().await.remove(room_id).is_some() {
            tracing::info!(%room_id, "room removed");
        }
    }

    /// Returns a room's metadata.
    pub async fn info(&self, room_id: &RoomId) -> Result<RoomInfo, RoomError> {
        let handle = {
            let rooms = self.rooms.lock().await;
            rooms
                .get(room_id)
                .cloned()
                .ok_or_else(|| RoomError::NotFound(room_id.clone()))?
        };
        handle.info().await
    }

    /// Lists every live room id, in no particular order.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.lock().await.keys().cloned().collect()
    }

    /// The number of live rooms.
    pub async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.lock().await.is_empty()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
