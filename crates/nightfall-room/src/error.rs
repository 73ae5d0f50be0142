//! Error types for the room layer.

use nightfall_protocol::RoomId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist. Leaves and game commands against an
    /// unknown room are logged no-ops at the gateway, never fatal.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room's game has already started; new players would have no
    /// role, so the join is rejected.
    #[error("room {0} has already started its game")]
    GameInProgress(RoomId),

    /// The room's command channel is closed or full.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
