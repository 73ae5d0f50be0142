//! The engine: players, phases, and night resolution for one room.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{EngineError, Role};
use nightfall_protocol::{Phase, PlayerId, PlayerView};

/// One participant's game state.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub role: Option<Role>,
    pub alive: bool,
}

/// The state machine for one room's game.
///
/// Phases alternate `Waiting → Night → Day → Night → …`. Transitions are
/// explicit operations ([`begin_night`](Self::begin_night),
/// [`resolve_night`](Self::resolve_night)) invoked by an external
/// orchestrator; nothing advances implicitly. There is no terminal state —
/// win detection is the caller's concern.
///
/// Night actions don't take effect immediately: saves and kills accumulate
/// while the night lasts and are resolved together at `resolve_night`, so
/// saving and killing the same target produces the same outcome in either
/// order.
#[derive(Debug, Default)]
pub struct Engine {
    players: Vec<Player>,
    phase: Phase,
    /// Targets protected this night. Cleared on resolution.
    saved: HashSet<PlayerId>,
    /// Targets marked for death this night. Cleared on resolution.
    doomed: HashSet<PlayerId>,
    /// Everyone who has died, in death order. Never reset.
    killed: Vec<PlayerId>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            phase: Phase::Waiting,
            saved: HashSet::new(),
            doomed: HashSet::new(),
            killed: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// The cumulative dead log, in death order.
    pub fn killed(&self) -> &[PlayerId] {
        &self.killed
    }

    /// The role a player holds, if they exist and have one.
    pub fn role_of(&self, id: &PlayerId) -> Option<Role> {
        self.players.iter().find(|p| &p.id == id)?.role
    }

    /// Appends a new player with no role, alive.
    ///
    /// Legal only while waiting — a player added after role assignment
    /// would have no role, so the attempt is rejected rather than
    /// tolerated. Re-adding a present id is a no-op.
    pub fn add_player(&mut self, id: PlayerId) -> Result<(), EngineError> {
        if self.phase != Phase::Waiting {
            return Err(EngineError::InvalidPhase {
                op: "add_player",
                phase: self.phase,
            });
        }
        if self.players.iter().any(|p| p.id == id) {
            return Ok(());
        }
        self.players.push(Player {
            id,
            role: None,
            alive: true,
        });
        Ok(())
    }

    /// Removes a player in any phase. Models a disconnect: the player is
    /// not treated as killed, they simply vanish from later snapshots.
    pub fn remove_player(&mut self, id: &PlayerId) {
        self.players.retain(|p| &p.id != id);
        self.saved.remove(id);
        self.doomed.remove(id);
    }

    /// Shuffles `roles` uniformly and assigns them positionally to the
    /// players in join order.
    ///
    /// Rejects with [`EngineError::RoleCountMismatch`] before touching any
    /// player when the list length doesn't match the player count.
    pub fn assign_roles(&mut self, roles: Vec<Role>) -> Result<(), EngineError> {
        self.assign_roles_with(&mut rand::rng(), roles)
    }

    /// [`assign_roles`](Self::assign_roles) with a caller-supplied RNG,
    /// so tests can seed the shuffle.
    pub fn assign_roles_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        mut roles: Vec<Role>,
    ) -> Result<(), EngineError> {
        if self.phase != Phase::Waiting {
            return Err(EngineError::InvalidPhase {
                op: "assign_roles",
                phase: self.phase,
            });
        }
        if roles.len() != self.players.len() {
            return Err(EngineError::RoleCountMismatch {
                expected: self.players.len(),
                got: roles.len(),
            });
        }
        // Fisher-Yates, a uniform permutation.
        roles.shuffle(rng);
        for (player, role) in self.players.iter_mut().zip(roles) {
            player.role = Some(role);
        }
        tracing::debug!(players = self.players.len(), "roles assigned");
        Ok(())
    }

    /// Starts a night: from `Waiting` (once roles are assigned) or from
    /// `Day`.
    pub fn begin_night(&mut self) -> Result<(), EngineError> {
        match self.phase {
            Phase::Waiting => {
                if self.players.iter().any(|p| p.role.is_none()) {
                    return Err(EngineError::RolesNotAssigned);
                }
            }
            Phase::Day => {}
            Phase::Night => {
                return Err(EngineError::InvalidPhase {
                    op: "begin_night",
                    phase: self.phase,
                });
            }
        }
        self.phase = Phase::Night;
        Ok(())
    }

    /// Protects `target` from death for the current night. Idempotent.
    pub fn save_player(&mut self, target: &PlayerId) -> Result<(), EngineError> {
        if self.phase != Phase::Night {
            return Err(EngineError::InvalidPhase {
                op: "save_player",
                phase: self.phase,
            });
        }
        self.saved.insert(target.clone());
        Ok(())
    }

    /// Marks `target` for death at night resolution.
    ///
    /// No-op when the target is unknown, already dead, or already saved
    /// this night. A save recorded after the kill still wins — pending
    /// kills are checked against the save set again at resolution.
    pub fn kill_player(&mut self, target: &PlayerId) -> Result<(), EngineError> {
        if self.phase != Phase::Night {
            return Err(EngineError::InvalidPhase {
                op: "kill_player",
                phase: self.phase,
            });
        }
        let Some(player) = self.players.iter().find(|p| &p.id == target) else {
            return Ok(());
        };
        if !player.alive || self.saved.contains(target) {
            return Ok(());
        }
        self.doomed.insert(target.clone());
        Ok(())
    }

    /// Resolves the night: applies every pending kill not covered by a
    /// save, clears both night sets, and advances to day.
    pub fn resolve_night(&mut self) -> Result<(), EngineError> {
        if self.phase != Phase::Night {
            return Err(EngineError::InvalidPhase {
                op: "resolve_night",
                phase: self.phase,
            });
        }
        for player in &mut self.players {
            if player.alive
                && self.doomed.contains(&player.id)
                && !self.saved.contains(&player.id)
            {
                player.alive = false;
                self.killed.push(player.id.clone());
                tracing::debug!(player = %player.id, "died in the night");
            }
        }
        self.saved.clear();
        self.doomed.clear();
        self.phase = Phase::Day;
        Ok(())
    }

    /// A projection of the game as `viewer` is allowed to see it.
    ///
    /// A living player's role is visible only to that player; the dead
    /// have their roles revealed to everyone.
    pub fn snapshot_for(&self, viewer: &PlayerId) -> Vec<PlayerView> {
        self.players
            .iter()
            .map(|p| {
                let visible = !p.alive || &p.id == viewer;
                PlayerView {
                    id: p.id.clone(),
                    role: p
                        .role
                        .filter(|_| visible)
                        .map(|r| r.name().to_string()),
                    alive: p.alive,
                }
            })
            .collect()
    }

    /// The unredacted projection. For tests and diagnostics only — never
    /// broadcast this to clients.
    pub fn snapshot(&self) -> Vec<PlayerView> {
        self.players
            .iter()
            .map(|p| PlayerView {
                id: p.id.clone(),
                role: p.role.map(|r| r.name().to_string()),
                alive: p.alive,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    /// An engine with players A..=(A + n - 1), still waiting.
    fn lobby(names: &[&str]) -> Engine {
        let mut engine = Engine::new();
        for name in names {
            engine.add_player(pid(name)).unwrap();
        }
        engine
    }

    /// An engine in its first night with the given seeded assignment.
    fn night(names: &[&str], roles: Vec<Role>, seed: u64) -> Engine {
        let mut engine = lobby(names);
        engine
            .assign_roles_with(&mut StdRng::seed_from_u64(seed), roles)
            .unwrap();
        engine.begin_night().unwrap();
        engine
    }

    fn alive(engine: &Engine, id: &str) -> bool {
        engine
            .players()
            .iter()
            .find(|p| p.id == pid(id))
            .expect("player exists")
            .alive
    }

    // =====================================================================
    // Membership
    // =====================================================================

    #[test]
    fn test_add_player_starts_alive_and_roleless() {
        let engine = lobby(&["A"]);
        let p = &engine.players()[0];
        assert_eq!(p.id, pid("A"));
        assert!(p.alive);
        assert!(p.role.is_none());
    }

    #[test]
    fn test_add_player_duplicate_is_noop() {
        let mut engine = lobby(&["A"]);
        engine.add_player(pid("A")).unwrap();
        assert_eq!(engine.player_count(), 1);
    }

    #[test]
    fn test_add_player_rejected_after_night_begins() {
        let mut engine = night(&["A", "B"], vec![Role::Doctor, Role::Mafia], 1);
        let result = engine.add_player(pid("C"));
        assert!(matches!(
            result,
            Err(EngineError::InvalidPhase { op: "add_player", .. })
        ));
        assert_eq!(engine.player_count(), 2);
    }

    #[test]
    fn test_remove_player_works_in_any_phase() {
        let mut engine = night(&["A", "B"], vec![Role::Doctor, Role::Mafia], 1);
        engine.remove_player(&pid("A"));
        assert_eq!(engine.player_count(), 1);
        assert_eq!(engine.players()[0].id, pid("B"));
    }

    #[test]
    fn test_remove_player_is_not_a_death() {
        let mut engine = night(&["A", "B"], vec![Role::Doctor, Role::Mafia], 1);
        engine.remove_player(&pid("A"));
        assert!(engine.killed().is_empty());
    }

    // =====================================================================
    // Role assignment
    // =====================================================================

    #[test]
    fn test_assign_roles_rejects_count_mismatch() {
        let mut engine = lobby(&["A", "B", "C"]);
        let result = engine.assign_roles(vec![Role::Doctor, Role::Mafia]);
        assert!(matches!(
            result,
            Err(EngineError::RoleCountMismatch { expected: 3, got: 2 })
        ));
        // Nothing was mutated.
        assert!(engine.players().iter().all(|p| p.role.is_none()));
    }

    #[test]
    fn test_assign_roles_is_a_bijection() {
        let mut engine = lobby(&["A", "B", "C", "D"]);
        engine
            .assign_roles(vec![Role::Doctor, Role::Mafia, Role::Villager, Role::Villager])
            .unwrap();

        assert!(engine.players().iter().all(|p| p.role.is_some()));
        let doctors = engine
            .players()
            .iter()
            .filter(|p| p.role == Some(Role::Doctor))
            .count();
        let mafiosi = engine
            .players()
            .iter()
            .filter(|p| p.role == Some(Role::Mafia))
            .count();
        assert_eq!(doctors, 1);
        assert_eq!(mafiosi, 1);
    }

    #[test]
    fn test_assign_roles_deterministic_under_fixed_seed() {
        let roles = vec![Role::Doctor, Role::Mafia, Role::Villager];
        let mut a = lobby(&["A", "B", "C"]);
        let mut b = lobby(&["A", "B", "C"]);
        a.assign_roles_with(&mut StdRng::seed_from_u64(5), roles.clone())
            .unwrap();
        b.assign_roles_with(&mut StdRng::seed_from_u64(5), roles)
            .unwrap();

        for (pa, pb) in a.players().iter().zip(b.players()) {
            assert_eq!(pa.role, pb.role);
        }
    }

    #[test]
    fn test_assign_roles_rejected_after_night_begins() {
        let mut engine = night(&["A", "B"], vec![Role::Doctor, Role::Mafia], 1);
        let result = engine.assign_roles(vec![Role::Villager, Role::Villager]);
        assert!(matches!(result, Err(EngineError::InvalidPhase { .. })));
    }

    // =====================================================================
    // Phase transitions
    // =====================================================================

    #[test]
    fn test_begin_night_requires_roles() {
        let mut engine = lobby(&["A", "B"]);
        assert!(matches!(
            engine.begin_night(),
            Err(EngineError::RolesNotAssigned)
        ));
        assert_eq!(engine.phase(), Phase::Waiting);
    }

    #[test]
    fn test_phases_alternate_night_day_night() {
        let mut engine = night(&["A", "B"], vec![Role::Doctor, Role::Mafia], 1);
        assert_eq!(engine.phase(), Phase::Night);
        engine.resolve_night().unwrap();
        assert_eq!(engine.phase(), Phase::Day);
        engine.begin_night().unwrap();
        assert_eq!(engine.phase(), Phase::Night);
    }

    #[test]
    fn test_begin_night_during_night_is_rejected() {
        let mut engine = night(&["A", "B"], vec![Role::Doctor, Role::Mafia], 1);
        assert!(matches!(
            engine.begin_night(),
            Err(EngineError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn test_resolve_night_outside_night_is_rejected() {
        let mut engine = lobby(&["A"]);
        assert!(matches!(
            engine.resolve_night(),
            Err(EngineError::InvalidPhase { .. })
        ));
    }

    // =====================================================================
    // Save / kill resolution
    // =====================================================================

    #[test]
    fn test_save_outside_night_is_rejected() {
        let mut engine = lobby(&["A"]);
        assert!(matches!(
            engine.save_player(&pid("A")),
            Err(EngineError::InvalidPhase { op: "save_player", .. })
        ));
    }

    #[test]
    fn test_kill_without_save_is_fatal() {
        let mut engine =
            night(&["A", "B", "C"], vec![Role::Doctor, Role::Mafia, Role::Villager], 1);
        engine.kill_player(&pid("C")).unwrap();
        engine.resolve_night().unwrap();
        assert!(!alive(&engine, "C"));
        assert_eq!(engine.killed(), &[pid("C")]);
    }

    #[test]
    fn test_save_then_kill_leaves_target_alive() {
        let mut engine =
            night(&["A", "B", "C"], vec![Role::Doctor, Role::Mafia, Role::Villager], 1);
        engine.save_player(&pid("C")).unwrap();
        engine.kill_player(&pid("C")).unwrap();
        engine.resolve_night().unwrap();
        assert!(alive(&engine, "C"));
        assert!(engine.killed().is_empty());
    }

    #[test]
    fn test_kill_then_save_leaves_target_alive() {
        let mut engine =
            night(&["A", "B", "C"], vec![Role::Doctor, Role::Mafia, Role::Villager], 1);
        engine.kill_player(&pid("C")).unwrap();
        engine.save_player(&pid("C")).unwrap();
        engine.resolve_night().unwrap();
        assert!(alive(&engine, "C"));
        assert!(engine.killed().is_empty());
    }

    #[test]
    fn test_double_kill_is_idempotent() {
        let mut engine =
            night(&["A", "B", "C"], vec![Role::Doctor, Role::Mafia, Role::Villager], 1);
        engine.kill_player(&pid("C")).unwrap();
        engine.kill_player(&pid("C")).unwrap();
        engine.resolve_night().unwrap();
        assert_eq!(engine.killed(), &[pid("C")]);
    }

    #[test]
    fn test_kill_unknown_target_is_noop() {
        let mut engine = night(&["A", "B"], vec![Role::Doctor, Role::Mafia], 1);
        engine.kill_player(&pid("Z")).unwrap();
        engine.resolve_night().unwrap();
        assert!(engine.killed().is_empty());
    }

    #[test]
    fn test_kill_dead_target_is_noop() {
        let mut engine =
            night(&["A", "B", "C"], vec![Role::Doctor, Role::Mafia, Role::Villager], 1);
        engine.kill_player(&pid("C")).unwrap();
        engine.resolve_night().unwrap();

        engine.begin_night().unwrap();
        engine.kill_player(&pid("C")).unwrap();
        engine.resolve_night().unwrap();
        assert_eq!(engine.killed(), &[pid("C")]);
    }

    #[test]
    fn test_save_protects_one_night_only() {
        let mut engine =
            night(&["A", "B", "C"], vec![Role::Doctor, Role::Mafia, Role::Villager], 1);
        engine.save_player(&pid("C")).unwrap();
        engine.resolve_night().unwrap();

        // The save was cleared; a kill the next night lands.
        engine.begin_night().unwrap();
        engine.kill_player(&pid("C")).unwrap();
        engine.resolve_night().unwrap();
        assert!(!alive(&engine, "C"));
    }

    // =====================================================================
    // Snapshots
    // =====================================================================

    #[test]
    fn test_snapshot_for_hides_living_opponents_roles() {
        let engine =
            night(&["A", "B", "C"], vec![Role::Doctor, Role::Mafia, Role::Villager], 1);
        let view = engine.snapshot_for(&pid("A"));

        let own = view.iter().find(|v| v.id == pid("A")).unwrap();
        assert!(own.role.is_some(), "viewer sees their own role");
        for other in view.iter().filter(|v| v.id != pid("A")) {
            assert!(other.role.is_none(), "living opponents stay hidden");
        }
    }

    #[test]
    fn test_snapshot_for_reveals_the_dead() {
        let mut engine =
            night(&["A", "B", "C"], vec![Role::Doctor, Role::Mafia, Role::Villager], 1);
        engine.kill_player(&pid("C")).unwrap();
        engine.resolve_night().unwrap();

        let view = engine.snapshot_for(&pid("A"));
        let dead = view.iter().find(|v| v.id == pid("C")).unwrap();
        assert!(!dead.alive);
        assert!(dead.role.is_some(), "dead players' roles are public");
    }

    #[test]
    fn test_snapshot_before_assignment_has_no_roles() {
        let engine = lobby(&["A", "B"]);
        let view = engine.snapshot_for(&pid("A"));
        assert!(view.iter().all(|v| v.role.is_none() && v.alive));
    }

    #[test]
    fn test_snapshot_preserves_join_order() {
        let engine = lobby(&["C", "A", "B"]);
        let ids: Vec<_> = engine
            .snapshot_for(&pid("A"))
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![pid("C"), pid("A"), pid("B")]);
    }

    // =====================================================================
    // The full doctor-saves-the-victim scenario
    // =====================================================================

    #[test]
    fn test_doctor_save_beats_mafia_kill_end_to_end() {
        let mut engine = lobby(&["A", "B", "C"]);
        engine
            .assign_roles_with(
                &mut StdRng::seed_from_u64(42),
                vec![Role::Doctor, Role::Mafia, Role::Villager],
            )
            .unwrap();
        engine.begin_night().unwrap();

        let doctor = engine
            .players()
            .iter()
            .find(|p| p.role == Some(Role::Doctor))
            .unwrap()
            .id
            .clone();
        let victim = engine
            .players()
            .iter()
            .find(|p| p.role == Some(Role::Villager))
            .unwrap()
            .id
            .clone();

        // Dispatch through the catalog, the way the room layer does.
        Role::Doctor.night_action(&mut engine, &victim).unwrap();
        Role::Mafia.night_action(&mut engine, &victim).unwrap();
        engine.resolve_night().unwrap();

        assert_eq!(engine.phase(), Phase::Day);
        let view = engine.snapshot_for(&doctor);
        let v = view.iter().find(|v| v.id == victim).unwrap();
        assert!(v.alive);
    }
}
