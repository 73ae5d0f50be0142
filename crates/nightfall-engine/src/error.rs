//! Error types for the game engine.

use nightfall_protocol::Phase;

/// Rejected engine operations. State is never mutated on error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// `assign_roles` was given a list whose length doesn't match the
    /// player count. Undersized or oversized lists are a contract
    /// violation, never silently truncated or padded.
    #[error("role count mismatch: {expected} players, {got} roles")]
    RoleCountMismatch { expected: usize, got: usize },

    /// An operation was attempted outside its legal phase.
    #[error("{op} is not legal during the {phase} phase")]
    InvalidPhase { op: &'static str, phase: Phase },

    /// A night can't start until every player has a role.
    #[error("roles have not been assigned")]
    RolesNotAssigned,
}
