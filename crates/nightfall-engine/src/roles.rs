//! The role catalog: a closed set of variants and their night actions.
//!
//! Roles never mutate game state directly. A role's night action routes to
//! exactly one of the engine's public operations, so the [`Engine`] stays
//! the sole owner of game state. Adding a role means adding a variant and
//! a dispatch arm — the engine's contract doesn't change.

use serde::{Deserialize, Serialize};

use crate::{Engine, EngineError};
use nightfall_protocol::PlayerId;

/// Which faction a role belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Town,
    Villager,
    Mafia,
}

/// A game role. Immutable, shared by every room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Villager,
    Doctor,
    Mafia,
}

impl Role {
    /// The display name clients see. "Mafioso" rather than "Mafia" —
    /// the role is the person, the alignment is the faction.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Villager => "Villager",
            Self::Doctor => "Doctor",
            Self::Mafia => "Mafioso",
        }
    }

    pub fn alignment(&self) -> Alignment {
        match self {
            Self::Villager => Alignment::Villager,
            Self::Doctor => Alignment::Town,
            Self::Mafia => Alignment::Mafia,
        }
    }

    /// Parses a role from its wire name. Accepts both the display name
    /// and the variant name for the mafia ("Mafioso" or "Mafia").
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Villager" => Some(Self::Villager),
            "Doctor" => Some(Self::Doctor),
            "Mafioso" | "Mafia" => Some(Self::Mafia),
            _ => None,
        }
    }

    /// Performs this role's night action on `target`.
    ///
    /// Doctor saves, Mafia kills, Villager does nothing. Each arm calls a
    /// single engine operation; phase legality is the engine's to enforce.
    pub fn night_action(
        &self,
        engine: &mut Engine,
        target: &PlayerId,
    ) -> Result<(), EngineError> {
        match self {
            Self::Doctor => engine.save_player(target),
            Self::Mafia => engine.kill_player(target),
            Self::Villager => Ok(()),
        }
    }
}
