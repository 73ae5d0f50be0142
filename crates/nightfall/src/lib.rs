//! # Nightfall
//!
//! A WebSocket server that coordinates clients into named rooms and runs
//! a hidden-role day/night game inside each one.
//!
//! The stack, bottom to top: `nightfall-protocol` (wire types),
//! `nightfall-engine` (game rules), `nightfall-room` (room actors and the
//! registry), and this crate — the accept loop plus the per-connection
//! session gateway, the only layer that touches transport.
//!
//! ```rust,no_run
//! use nightfall::NightfallServer;
//!
//! # async fn run() -> Result<(), nightfall::ServerError> {
//! let server = NightfallServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod gateway;
mod server;

pub use error::ServerError;
pub use server::{NightfallServer, NightfallServerBuilder};
