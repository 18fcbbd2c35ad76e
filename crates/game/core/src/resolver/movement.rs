//! Movement along terrain-weighted paths, trap triggers, forced displacement.

use super::CombatContext;
use crate::config::BattleConfig;
use crate::engine::BattleEvent;
use crate::env::MapOracle;
use crate::error::CommandError;
use crate::hex::{Hex, Reachable, reachable};
use crate::state::{BattleState, TrapKind, TurnFlags, Unit, UnitId};
use crate::status::{Buff, BuffKind};

/// Hexes `unit` can walk to this turn.
pub fn reachable_for(state: &BattleState, map: &dyn MapOracle, unit: &Unit) -> Reachable {
    let budget = unit.stats().movement;
    reachable(unit.position, budget, |hex| {
        if !state.is_free(hex, Some(unit.id)) {
            return None;
        }
        map.move_cost(hex)
            .filter(|cost| *cost < BattleConfig::IMPASSABLE_COST)
    })
}

impl CombatContext<'_> {
    /// True when `hex` is on the map, passable and not held by a living unit
    /// other than `ignore`.
    pub fn is_open(&self, hex: Hex, ignore: Option<UnitId>) -> bool {
        self.map.is_passable(hex) && self.state.is_free(hex, ignore)
    }

    /// Validated move for the current actor.
    pub fn move_unit(&mut self, id: UnitId, dest: Hex) -> Result<(), CommandError> {
        let unit = self.state.unit(id).ok_or(CommandError::UnitNotFound(id))?;
        if let Some(turn) = &self.state.turn
            && turn.flags.contains(TurnFlags::MOVED)
        {
            return Err(CommandError::AlreadyMoved);
        }
        if unit.has(BuffKind::Root) {
            return Err(CommandError::Rooted);
        }
        let area = reachable_for(self.state, self.map, unit);
        let path = area.path_to(dest).ok_or(CommandError::Unreachable(dest))?;

        if let Some(turn) = self.state.turn.as_mut() {
            turn.flags.insert(TurnFlags::MOVED);
        }
        self.walk(id, &path);
        Ok(())
    }

    /// Steps `id` along `path`, turning to face each step and springing
    /// opposing traps. Stops early when a snare holds the unit or it dies.
    /// Returns the hex the unit ended on.
    pub(crate) fn walk(&mut self, id: UnitId, path: &[Hex]) -> Hex {
        let Some(unit) = self.state.unit(id) else {
            return path.first().copied().unwrap_or_default();
        };
        let team = unit.team;
        let mut segment_start = unit.position;

        for &hex in path {
            let Some(unit) = self.state.unit_mut(id) else {
                break;
            };
            if let Some(direction) = unit.position.direction_to(hex) {
                unit.facing = direction;
            }
            unit.position = hex;

            let springs = self
                .state
                .trap_at(hex)
                .is_some_and(|trap| trap.team != team);
            if !springs {
                continue;
            }

            self.push_moved(id, segment_start, hex);
            segment_start = hex;
            let halted = self.spring_trap(id, hex);
            if halted {
                return hex;
            }
        }

        if let Some(unit) = self.state.unit(id)
            && unit.position != segment_start
        {
            let end = unit.position;
            self.push_moved(id, segment_start, end);
        }
        self.state.unit(id).map_or(segment_start, |u| u.position)
    }

    fn push_moved(&mut self, id: UnitId, from: Hex, to: Hex) {
        let facing = self.state.unit(id).map(|u| u.facing).unwrap_or_default();
        self.events.push(BattleEvent::UnitMoved {
            unit: id,
            from,
            to,
            facing,
        });
    }

    /// Triggers and removes the trap on `hex`. Returns true when the walker
    /// must stop.
    fn spring_trap(&mut self, id: UnitId, hex: Hex) -> bool {
        let Some(trap) = self.state.take_trap(hex) else {
            return false;
        };
        self.events.push(BattleEvent::TrapTriggered {
            position: hex,
            kind: trap.kind,
            unit: id,
        });
        match trap.kind {
            TrapKind::Spike => {
                self.deal_raw_damage(Some(trap.owner), id, trap.power.max(1));
                self.state.unit(id).is_none_or(|u| !u.is_alive())
            }
            TrapKind::Snare => {
                if let Some(unit) = self.state.unit_mut(id) {
                    unit.buffs.apply(Buff::new(BuffKind::Root, 1, 0.0).with_caster(trap.owner));
                }
                self.events.push(BattleEvent::BuffApplied {
                    target: id,
                    buff: BuffKind::Root,
                    duration: 1,
                    refreshed: false,
                });
                true
            }
        }
    }

    /// Moves `id` straight to `to` (knockback, pull, teleport, swap).
    pub(crate) fn displace(&mut self, id: UnitId, to: Hex) {
        let Some(unit) = self.state.unit_mut(id) else {
            return;
        };
        let from = unit.position;
        if from == to {
            return;
        }
        unit.position = to;
        self.events.push(BattleEvent::Displaced { unit: id, from, to });
    }

    /// Path a melee caster takes to close in on `target`: the traced line up
    /// to the last open hex before the target. Fails unless that hex is
    /// adjacent to the target and within the caster's movement.
    pub(crate) fn dash_path(&self, caster: &Unit, target: Hex) -> Result<Vec<Hex>, CommandError> {
        if caster.has(BuffKind::Root) {
            return Err(CommandError::Rooted);
        }
        let mut path = Vec::new();
        for hex in crate::hex::line_cells(caster.position, target) {
            if hex == target || !self.is_open(hex, Some(caster.id)) {
                break;
            }
            path.push(hex);
        }
        let landing = path.last().copied().unwrap_or(caster.position);
        if landing.distance(target) != 1 || path.len() as u32 > caster.stats().movement {
            return Err(CommandError::DashBlocked(target));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{HexMap, TerrainCosts, TerrainKind};
    use crate::resolver::tests::{Arena, soldier};
    use crate::state::{Team, Trap, TurnState};

    fn arena_with_actor() -> Arena {
        let mut arena = Arena::new(vec![
            soldier(0, Team::Player, Hex::ORIGIN),
            soldier(1, Team::Enemy, Hex::new(4, 0)),
        ]);
        arena.state.turn = Some(TurnState::new(UnitId(0)));
        arena
    }

    #[test]
    fn reachable_set_respects_budget_and_occupancy() {
        let mut arena = arena_with_actor();
        arena.unit_mut(1).position = Hex::new(1, 0);
        arena.map = HexMap::hexagon(6, TerrainCosts::new())
            .with_terrain(Hex::new(0, 1), TerrainKind::Wall)
            .with_terrain(Hex::new(-1, 0), TerrainKind::Water);
        let unit = arena.unit(0).clone();
        let area = reachable_for(&arena.state, &arena.map, &unit);
        assert!(!area.contains(Hex::new(1, 0)));
        assert!(!area.contains(Hex::new(0, 1)));
        assert_eq!(area.cost(Hex::new(-1, 0)), Some(3));
        assert!(area.iter().all(|(_, cost)| cost <= 3));
    }

    #[test]
    fn move_sets_flag_and_faces_the_last_step() {
        let mut arena = arena_with_actor();
        arena.ctx().move_unit(UnitId(0), Hex::new(2, 0)).expect("move");
        assert_eq!(arena.unit(0).position, Hex::new(2, 0));
        assert_eq!(arena.unit(0).facing, crate::hex::Direction::East);
        assert_eq!(
            arena.ctx().move_unit(UnitId(0), Hex::new(3, 0)),
            Err(CommandError::AlreadyMoved)
        );
    }

    #[test]
    fn unreachable_and_rooted_moves_are_rejected() {
        let mut arena = arena_with_actor();
        assert_eq!(
            arena.ctx().move_unit(UnitId(0), Hex::new(5, 0)),
            Err(CommandError::Unreachable(Hex::new(5, 0)))
        );
        arena.unit_mut(0).buffs.apply(Buff::new(BuffKind::Root, 1, 0.0));
        assert_eq!(
            arena.ctx().move_unit(UnitId(0), Hex::new(1, 0)),
            Err(CommandError::Rooted)
        );
    }

    #[test]
    fn snare_halts_the_walk() {
        let mut arena = arena_with_actor();
        arena.state.traps.push(Trap {
            position: Hex::new(1, 0),
            kind: TrapKind::Snare,
            owner: UnitId(1),
            team: Team::Enemy,
            power: 0,
        });
        arena.ctx().move_unit(UnitId(0), Hex::new(3, 0)).expect("move starts");
        assert_eq!(arena.unit(0).position, Hex::new(1, 0));
        assert!(arena.unit(0).has(BuffKind::Root));
        assert!(arena.state.traps.is_empty());
    }

    #[test]
    fn spikes_hurt_but_own_traps_are_safe() {
        let mut arena = arena_with_actor();
        arena.state.traps.push(Trap {
            position: Hex::new(1, 0),
            kind: TrapKind::Spike,
            owner: UnitId(1),
            team: Team::Enemy,
            power: 12,
        });
        arena.state.traps.push(Trap {
            position: Hex::new(2, 0),
            kind: TrapKind::Spike,
            owner: UnitId(0),
            team: Team::Player,
            power: 12,
        });
        let before = arena.unit(0).hp;
        arena.ctx().move_unit(UnitId(0), Hex::new(3, 0)).expect("move");
        assert_eq!(arena.unit(0).position, Hex::new(3, 0));
        assert_eq!(arena.unit(0).hp, before - 12);
        assert_eq!(arena.state.traps.len(), 1);
    }

    #[test]
    fn dash_stops_next_to_the_target() {
        let mut arena = arena_with_actor();
        let caster = arena.unit(0).clone();
        let path = arena.ctx().dash_path(&caster, Hex::new(4, 0)).expect("dash");
        assert_eq!(path, vec![Hex::new(1, 0), Hex::new(2, 0), Hex::new(3, 0)]);

        arena.unit_mut(1).position = Hex::new(5, 0);
        let caster = arena.unit(0).clone();
        assert_eq!(
            arena.ctx().dash_path(&caster, Hex::new(5, 0)),
            Err(CommandError::DashBlocked(Hex::new(5, 0)))
        );
    }
}
