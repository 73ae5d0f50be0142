//! Core protocol types for Nightfall's wire format.
//!
//! Every type here gets serialized to JSON, sent over the socket, and
//! deserialized on the other side. Both event enums are internally tagged
//! (`#[serde(tag = "type")]`), so a consumer discriminates on the `type`
//! field rather than guessing from the payload shape.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A participant's identifier within a room.
///
/// Newtype wrapper over a client-provided string. The id is scoped to a
/// live connection — it is not a durable user identity, just the name the
/// connection joined under. `#[serde(transparent)]` makes `PlayerId("A")`
/// serialize as plain `"A"` rather than a wrapping object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A room's identifier: an opaque string, provided by the client on join
/// and stable for the life of the room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The current stage of a room's game.
///
/// Rooms alternate `Night → Day → Night → …` once a game starts; `Waiting`
/// is the pre-game lobby state. Serialized lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Waiting,
    Night,
    Day,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Night => write!(f, "night"),
            Self::Day => write!(f, "day"),
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerView
// ---------------------------------------------------------------------------

/// One participant as seen by a particular viewer.
///
/// `role` is `None` until roles are assigned — and stays `None` for any
/// living player other than the viewer, so a snapshot never reveals a
/// hidden role to an opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub role: Option<String>,
    pub alive: bool,
}

// ---------------------------------------------------------------------------
// ClientEvent — inbound
// ---------------------------------------------------------------------------

/// Events a client sends to the server.
///
/// Join and leave carry the player's identity explicitly. Game events
/// are attributed to whichever identity the connection joined the room
/// under, so a connection cannot act on behalf of a player it never
/// joined as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Subscribe to a room, creating it if it doesn't exist yet.
    JoinRoom { player: PlayerId, room_id: RoomId },

    /// Leave a room. Leaving a room you're not in is a no-op.
    LeaveRoom { player: PlayerId, room_id: RoomId },

    /// Assign the given roles (by name) to the room's players and begin
    /// the first night. The list length must match the player count.
    StartGame { room_id: RoomId, roles: Vec<String> },

    /// Perform the sender's role-specific night action on a target.
    NightAction { room_id: RoomId, target: PlayerId },

    /// Resolve the current night: apply pending kills and move to day.
    EndNight { room_id: RoomId },

    /// Advance from day into the next night.
    BeginNight { room_id: RoomId },
}

// ---------------------------------------------------------------------------
// Update — outbound
// ---------------------------------------------------------------------------

/// The single outbound event type.
///
/// Every broadcast a client receives is an `Update`; the `type` tag is the
/// discriminant. `Rejected` is only ever sent to the client whose event
/// caused it — other room members see nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Update {
    /// A human-readable notice ("Player A joined room 5").
    Status { message: String },

    /// The room's membership and game state, redacted for the receiver.
    Members {
        room_id: RoomId,
        players: Vec<PlayerView>,
    },

    /// The room's phase changed.
    Phase { room_id: RoomId, phase: Phase },

    /// The receiver's last event was rejected. Nobody else is notified.
    Rejected { reason: String },
}
