//! Game engine for Nightfall: the per-room day/night state machine.
//!
//! One [`Engine`] instance owns one room's game: the player list, the
//! current [`Phase`], and the night's pending save/kill results. It is
//! pure and synchronous — no I/O, no channels — so the room layer can
//! drive it from a single task and broadcast after every mutation.
//!
//! # Key types
//!
//! - [`Engine`] — the state machine; all mutations go through its methods
//! - [`Role`] — the closed role catalog and its night-action dispatch
//! - [`EngineError`] — rejected operations (wrong phase, bad role count)

mod engine;
mod error;
mod roles;

pub use engine::{Engine, Player};
pub use error::EngineError;
pub use roles::{Alignment, Role};

pub use nightfall_protocol::Phase;
