//! Room layer for Nightfall.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its
//! member list and its game engine, so all mutations for one room are
//! serialized and broadcasts go out in a causally consistent order.
//! Rooms are created lazily on the first join to an unknown id and
//! destroyed the moment the last member leaves.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — the process-wide registry; the gateway's entry point
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`GameCommand`] — game operations routed through a room
//! - [`RoomError`] — room-level failures

mod error;
mod registry;
mod room;

pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{GameCommand, LeaveOutcome, RoomHandle, RoomInfo, UpdateSender};
