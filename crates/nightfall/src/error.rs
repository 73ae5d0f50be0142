//! Unified error type for the server crate.

use nightfall_protocol::ProtocolError;
use nightfall_room::RoomError;

/// Top-level error for server and gateway operations.
///
/// The `#[from]` attributes let `?` convert layer errors automatically;
/// gateway tasks log these rather than letting one connection's failure
/// affect any other.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding or accepting TCP connections failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The WebSocket handshake or a frame-level operation failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Encoding an outbound update failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level failure.
    #[error(transparent)]
    Room(#[from] RoomError),
}
