//! Combat resolution: turn lifecycle, skill casting, effect dispatch.
//!
//! [`CombatContext`] borrows everything a transition needs for the duration
//! of one operation. Operations mutate [`BattleState`] and push events; they
//! never block and never panic on bad input.

mod cast;
mod effects;
mod movement;
mod targeting;

pub use cast::CastPlan;
pub use movement::reachable_for;
pub use targeting::{collect_targets, hidden_opponents};

use crate::config::BattleConfig;
use crate::engine::{BattleEvent, EventLog};
use crate::env::{MapOracle, RollSource};
use crate::state::{BattleState, TurnFlags, TurnState, UnitId};
use crate::status::BuffKind;
use crate::turn::{self, GaugeCost};

/// How a unit's turn opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnStart {
    /// The unit may act; a turn is now in progress.
    Act,
    /// A crowd-control buff forfeits the turn.
    Skipped(BuffKind),
    /// Per-turn damage killed the unit.
    Died,
}

pub struct CombatContext<'a> {
    pub state: &'a mut BattleState,
    pub map: &'a dyn MapOracle,
    pub config: &'a BattleConfig,
    pub rolls: &'a mut dyn RollSource,
    pub events: &'a mut EventLog,
}

impl CombatContext<'_> {
    /// Opens `id`'s turn: Stop countdown on everyone else, cooldowns, buff
    /// ticks, then the crowd-control check.
    pub fn begin_turn(&mut self, id: UnitId) -> TurnStart {
        self.state.turn = None;
        self.events.push(BattleEvent::TurnStarted { unit: id });

        for other in self.state.units.iter_mut() {
            if other.id != id && other.is_alive() && other.buffs.advance_stop() {
                self.events.push(BattleEvent::BuffExpired {
                    target: other.id,
                    buff: BuffKind::Stop,
                });
            }
        }

        let Some(unit) = self.state.unit_mut(id) else {
            return TurnStart::Died;
        };
        unit.tick_cooldowns();
        let ticks = unit.buffs.tick();
        for tick in &ticks {
            if tick.damage > 0 {
                unit.lose_hp(tick.damage);
            }
            if tick.heal > 0 {
                unit.heal(tick.heal);
            }
        }
        unit.clamp_pools();
        let alive = unit.is_alive();
        let skip = unit.buffs.turn_skip_cause();

        for tick in ticks {
            if tick.damage > 0 || tick.heal > 0 {
                self.events.push(BattleEvent::BuffTicked {
                    target: id,
                    buff: tick.kind,
                    damage: tick.damage,
                    heal: tick.heal,
                });
            }
            if tick.expired {
                self.events.push(BattleEvent::BuffExpired {
                    target: id,
                    buff: tick.kind,
                });
            }
        }

        if !alive {
            self.handle_death(id, None);
            return TurnStart::Died;
        }
        if let Some(cause) = skip {
            self.events.push(BattleEvent::TurnSkipped { unit: id, cause });
            return TurnStart::Skipped(cause);
        }
        self.state.turn = Some(TurnState::new(id));
        TurnStart::Act
    }

    /// Closes `id`'s turn and debits its gauge. A no-op when `id` is not the
    /// current actor.
    pub fn end_turn(&mut self, id: UnitId) {
        let Some(turn) = self.state.turn.take_if(|turn| turn.actor == id) else {
            return;
        };
        let cost = if turn.flags.contains(TurnFlags::ACTED) {
            GaugeCost::Action(turn.action_cost.unwrap_or(self.config.gauge_threshold))
        } else if turn.flags.contains(TurnFlags::MOVED) {
            GaugeCost::MoveOnly
        } else {
            GaugeCost::Idle
        };
        self.debit(id, cost);
    }

    /// Debits a forfeited or otherwise actionless turn.
    pub fn skip_turn(&mut self, id: UnitId) {
        self.debit(id, GaugeCost::Idle);
    }

    fn debit(&mut self, id: UnitId, cost: GaugeCost) {
        let Some(unit) = self.state.unit_mut(id) else {
            return;
        };
        let gauge_cost = turn::debit(unit, cost, self.config);
        self.events.push(BattleEvent::TurnEnded {
            unit: id,
            gauge_cost,
        });
    }

    /// Death bookkeeping for a unit whose HP reached zero: revive passive,
    /// kill experience for the opposing side, battle-end check.
    pub fn handle_death(&mut self, victim: UnitId, killer: Option<UnitId>) {
        let Some(unit) = self.state.unit_mut(victim) else {
            return;
        };
        if unit.is_alive() {
            return;
        }
        if let Some(ratio) = unit.revive_ratio() {
            unit.revive_used = true;
            let hp = ((unit.stats().hp_max as f64 * ratio).floor() as i32).max(1);
            unit.hp = hp;
            self.events.push(BattleEvent::UnitRevived { unit: victim, hp });
            return;
        }

        unit.buffs.clear();
        unit.gauge = 0.0;
        let level = unit.level;
        let side = unit.team.opponent();
        self.events.push(BattleEvent::UnitDied {
            unit: victim,
            killer,
        });

        let xp = self.config.kill_xp(level, self.state.stage_cleared);
        if xp > 0 {
            for unit in self
                .state
                .units
                .iter_mut()
                .filter(|u| u.is_alive() && u.team == side)
            {
                let gained = unit.gain_xp(xp);
                self.events.push(BattleEvent::ExperienceGained {
                    unit: unit.id,
                    amount: xp,
                });
                if gained > 0 {
                    self.events.push(BattleEvent::LevelUp {
                        unit: unit.id,
                        level: unit.level,
                    });
                }
            }
        }

        self.check_battle_end();
    }

    /// Records the outcome once one side has no living units.
    pub fn check_battle_end(&mut self) {
        if self.state.outcome.is_some() {
            return;
        }
        if let Some(outcome) = self.state.decided_outcome() {
            self.state.outcome = Some(outcome);
            self.state.turn = None;
            tracing::info!(?outcome, "battle decided");
            self.events.push(BattleEvent::BattleEnded { outcome });
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::env::{HexMap, ScriptedRolls, TerrainCosts};
    use crate::hex::Hex;
    use crate::state::{BattleOutcome, Passive, PassiveKind, Team, Unit};
    use crate::stats::Attributes;
    use crate::status::Buff;

    /// Owns everything a [`CombatContext`] borrows.
    pub(crate) struct Arena {
        pub state: BattleState,
        pub map: HexMap,
        pub config: BattleConfig,
        pub rolls: ScriptedRolls,
        pub events: EventLog,
    }

    impl Arena {
        pub fn new(units: Vec<Unit>) -> Self {
            Self {
                state: BattleState::new(units, false),
                map: HexMap::hexagon(6, TerrainCosts::new()),
                config: BattleConfig::default(),
                // mid variance, front hits land, no stat crits, even statuses land
                rolls: ScriptedRolls::constant(0.5),
                events: EventLog::new(),
            }
        }

        pub fn ctx(&mut self) -> CombatContext<'_> {
            CombatContext {
                state: &mut self.state,
                map: &self.map,
                config: &self.config,
                rolls: &mut self.rolls,
                events: &mut self.events,
            }
        }

        pub fn unit(&self, id: u32) -> &Unit {
            self.state.unit(UnitId(id)).expect("unit exists")
        }

        pub fn unit_mut(&mut self, id: u32) -> &mut Unit {
            self.state.unit_mut(UnitId(id)).expect("unit exists")
        }

        pub fn saw(&self, pred: impl Fn(&BattleEvent) -> bool) -> bool {
            self.events.iter().any(pred)
        }
    }

    pub(crate) fn soldier(id: u32, team: Team, at: Hex) -> Unit {
        Unit::new(UnitId(id), format!("u{id}"), team, Attributes::uniform(10)).at(at)
    }

    #[test]
    fn poison_ticks_then_expires_at_turn_start() {
        let mut arena = Arena::new(vec![
            soldier(0, Team::Player, Hex::ORIGIN),
            soldier(1, Team::Enemy, Hex::new(3, 0)),
        ]);
        arena
            .unit_mut(0)
            .buffs
            .apply(Buff::new(BuffKind::Poison, 1, 7.0));
        let before = arena.unit(0).hp;

        assert_eq!(arena.ctx().begin_turn(UnitId(0)), TurnStart::Act);
        assert_eq!(arena.unit(0).hp, before - 7);
        assert!(!arena.unit(0).has(BuffKind::Poison));
        assert!(arena.saw(|e| matches!(e, BattleEvent::BuffExpired { buff: BuffKind::Poison, .. })));
        assert_eq!(arena.state.current_actor(), Some(UnitId(0)));
    }

    #[test]
    fn stunned_units_skip_and_pay_idle() {
        let mut arena = Arena::new(vec![
            soldier(0, Team::Player, Hex::ORIGIN),
            soldier(1, Team::Enemy, Hex::new(3, 0)),
        ]);
        arena.unit_mut(0).gauge = 100.0;
        arena.unit_mut(0).buffs.apply(Buff::new(BuffKind::Stun, 2, 0.0));

        let start = arena.ctx().begin_turn(UnitId(0));
        assert_eq!(start, TurnStart::Skipped(BuffKind::Stun));
        arena.ctx().skip_turn(UnitId(0));
        assert_eq!(arena.unit(0).gauge, 25.0);
        assert_eq!(arena.state.current_actor(), None);
    }

    #[test]
    fn stop_counts_down_on_other_turns() {
        let mut arena = Arena::new(vec![
            soldier(0, Team::Player, Hex::ORIGIN),
            soldier(1, Team::Enemy, Hex::new(3, 0)),
        ]);
        arena.unit_mut(1).buffs.apply(Buff::new(BuffKind::Stop, 1, 0.0));
        arena.ctx().begin_turn(UnitId(0));
        assert!(!arena.unit(1).has(BuffKind::Stop));
    }

    #[test]
    fn end_turn_debits_by_what_happened() {
        let mut arena = Arena::new(vec![
            soldier(0, Team::Player, Hex::ORIGIN),
            soldier(1, Team::Enemy, Hex::new(3, 0)),
        ]);
        arena.unit_mut(0).gauge = 100.0;
        arena.ctx().begin_turn(UnitId(0));
        if let Some(turn) = arena.state.turn.as_mut() {
            turn.flags.insert(TurnFlags::MOVED);
        }
        arena.ctx().end_turn(UnitId(0));
        assert_eq!(arena.unit(0).gauge, 50.0);

        // Not the actor any more: no-op.
        arena.ctx().end_turn(UnitId(0));
        assert_eq!(arena.unit(0).gauge, 50.0);
    }

    #[test]
    fn revive_passive_intercepts_death_once() {
        let phoenix = soldier(0, Team::Player, Hex::ORIGIN).with_passive(Passive::new(
            "phoenix",
            1,
            PassiveKind::ReviveOnDeath { hp_ratio: 0.5 },
        ));
        let mut arena = Arena::new(vec![phoenix, soldier(1, Team::Enemy, Hex::new(3, 0))]);
        let max = arena.unit(0).stats().hp_max;

        arena.unit_mut(0).hp = 0;
        arena.ctx().handle_death(UnitId(0), Some(UnitId(1)));
        assert_eq!(arena.unit(0).hp, max / 2);
        assert!(arena.unit(0).revive_used);

        arena.unit_mut(0).hp = 0;
        arena.ctx().handle_death(UnitId(0), Some(UnitId(1)));
        assert!(!arena.unit(0).is_alive());
        assert_eq!(arena.state.outcome, Some(BattleOutcome::Defeat));
    }

    #[test]
    fn kills_award_experience_to_the_opposing_side() {
        let mut arena = Arena::new(vec![
            soldier(0, Team::Player, Hex::ORIGIN),
            soldier(1, Team::Player, Hex::new(0, 1)),
            soldier(2, Team::Enemy, Hex::new(3, 0)).with_level(3),
            soldier(3, Team::Enemy, Hex::new(4, 0)),
        ]);
        arena.unit_mut(2).hp = 0;
        arena.ctx().handle_death(UnitId(2), Some(UnitId(0)));
        assert_eq!(arena.unit(0).xp, 60);
        assert_eq!(arena.unit(1).xp, 60);
        assert_eq!(arena.unit(3).xp, 0);
        assert_eq!(arena.state.outcome, None);

        arena.state.stage_cleared = true;
        arena.unit_mut(3).hp = 0;
        arena.ctx().handle_death(UnitId(3), Some(UnitId(0)));
        assert_eq!(arena.unit(0).xp, 65);
        assert_eq!(arena.state.outcome, Some(BattleOutcome::Victory));
        assert!(arena.saw(|e| matches!(e, BattleEvent::BattleEnded { outcome: BattleOutcome::Victory })));
    }
}
