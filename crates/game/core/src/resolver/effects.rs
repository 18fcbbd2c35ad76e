//! Effect dispatch.
//!
//! Every [`EffectKind`] is handled here. Effects collect their targets once,
//! up front, then resolve against each in roster order; a target that dies
//! mid-effect is skipped by the remaining steps.

use super::CombatContext;
use super::targeting::{collect_targets, hidden_opponents};
use crate::combat::{AttackProfile, BaseAttack, DamageOutcome, FacingRelation, resolve_damage};
use crate::config::BattleConfig;
use crate::engine::BattleEvent;
use crate::hex::{Hex, hex_in_direction};
use crate::skill::{Effect, EffectKind, Skill};
use crate::state::{Trap, TrapKind, Unit, UnitId};
use crate::status::{Buff, BuffApplication, BuffKind, StatusRoll, roll_application};

fn attack_profile(skill: &Skill, effect: &Effect, magnitude: f64) -> AttackProfile {
    let mut profile = AttackProfile::new(skill.category, skill.element, magnitude)
        .with_penetration(effect.penetration);
    if effect.sure_hit {
        profile = profile.sure_hit();
    }
    profile
}

impl CombatContext<'_> {
    /// Resolves one effect of `skill` cast by `caster` at `target`.
    pub fn apply_effect(&mut self, caster: UnitId, skill: &Skill, effect: &Effect, target: Hex) {
        let Some(source) = self.state.unit(caster).filter(|u| u.is_alive()).cloned() else {
            return;
        };
        let targets = collect_targets(self.state, &source, effect, target);

        match effect.kind {
            EffectKind::Damage | EffectKind::AreaDamage | EffectKind::LineDamage => {
                let profile = attack_profile(skill, effect, effect.magnitude);
                for id in targets {
                    self.strike(caster, id, &profile);
                }
            }
            EffectKind::MultiHit { hits } => {
                let profile = attack_profile(skill, effect, effect.magnitude);
                for id in targets {
                    for _ in 0..hits.max(1) {
                        if !self.is_living(id) {
                            break;
                        }
                        self.strike(caster, id, &profile);
                    }
                }
            }
            EffectKind::ChainDamage { bounces } => {
                if let Some(&first) = targets.first() {
                    self.chain(&source, skill, effect, first, bounces);
                }
            }
            EffectKind::Execute { threshold } => {
                let profile = attack_profile(skill, effect, effect.magnitude);
                for id in targets {
                    let doomed = self
                        .state
                        .unit(id)
                        .is_some_and(|u| u.hp_ratio() < threshold && !u.has(BuffKind::Invulnerable));
                    if doomed {
                        self.execute(caster, id);
                    } else {
                        self.strike(caster, id, &profile);
                    }
                }
            }
            EffectKind::DefenseScaledDamage => {
                let profile =
                    attack_profile(skill, effect, effect.magnitude).with_base(BaseAttack::Defense);
                for id in targets {
                    self.strike(caster, id, &profile);
                }
            }
            EffectKind::DistanceScaledDamage => {
                for id in targets {
                    let Some(distance) = self.state.unit(id).map(|u| u.position.distance(source.position))
                    else {
                        continue;
                    };
                    let magnitude = effect.magnitude
                        * (1.0 + BattleConfig::DISTANCE_DAMAGE_STEP * distance as f64);
                    let profile = attack_profile(skill, effect, magnitude);
                    self.strike(caster, id, &profile);
                }
            }

            EffectKind::Heal | EffectKind::AreaHeal => {
                let amount = effect.magnitude.max(0.0).floor() as i32;
                for id in targets {
                    self.heal_unit(id, |_| amount);
                }
            }
            EffectKind::HealPercent => {
                for id in targets {
                    self.heal_unit(id, |unit| {
                        (unit.stats().hp_max as f64 * effect.magnitude).max(0.0).floor() as i32
                    });
                }
            }
            EffectKind::HealFull => {
                for id in targets {
                    self.heal_unit(id, |unit| unit.stats().hp_max);
                }
            }

            EffectKind::Knockback => {
                for id in targets {
                    self.knock_back(&source, id, effect.area as i32 + 1);
                }
            }
            EffectKind::Pull => {
                for id in targets {
                    self.pull(&source, id);
                }
            }
            EffectKind::Teleport => {
                if self.is_open(target, Some(caster)) {
                    self.displace(caster, target);
                } else {
                    self.events.info(format!("{caster} cannot teleport to {target}"));
                }
            }
            EffectKind::Swap => {
                if let Some(&other) = targets.iter().find(|id| **id != caster) {
                    self.swap(caster, other);
                }
            }
            EffectKind::MoveBehind => {
                if let Some(&other) = targets.first() {
                    self.move_behind(caster, other);
                }
            }

            EffectKind::DrainMp => {
                let amount = effect.magnitude.max(0.0).floor() as i32;
                for id in targets {
                    let taken = -self.adjust_mp(id, -amount);
                    if taken > 0 {
                        self.adjust_mp(caster, taken);
                    }
                }
            }
            EffectKind::RestoreMp => {
                let amount = effect.magnitude.max(0.0).floor() as i32;
                for id in targets {
                    self.adjust_mp(id, amount);
                }
            }
            EffectKind::GaugeFill
            | EffectKind::GaugeDrain
            | EffectKind::GaugeSet
            | EffectKind::GaugeMax => {
                for id in targets {
                    self.adjust_gauge(id, effect.kind, effect.magnitude);
                }
            }

            EffectKind::Steal => {
                let amount = effect.magnitude.max(0.0).floor() as u32;
                for id in targets {
                    self.steal(id, amount);
                }
            }
            EffectKind::RevealStealth => {
                for id in hidden_opponents(self.state, &source, target, effect.area) {
                    self.strip(id, BuffKind::Stealth);
                }
            }
            EffectKind::ResetCooldown => {
                for id in targets {
                    if let Some(unit) = self.state.unit_mut(id) {
                        unit.cooldowns.clear();
                        self.events.push(BattleEvent::CooldownsReset { unit: id });
                    }
                }
            }
            EffectKind::PlaceTrap { trap } => {
                self.place_trap(&source, trap, target, effect.magnitude);
            }
            EffectKind::Cleanse => {
                for id in targets {
                    let Some(unit) = self.state.unit_mut(id) else {
                        continue;
                    };
                    for buff in unit.buffs.cleanse() {
                        self.events.push(BattleEvent::BuffRemoved { target: id, buff });
                    }
                }
            }
            EffectKind::Status { buff } => {
                for id in targets {
                    self.apply_status(&source, id, buff, effect);
                }
            }

            EffectKind::Unknown => {
                self.events
                    .warn(format!("skill `{}` carries an unknown effect; ignored", skill.id));
            }
        }
    }

    fn is_living(&self, id: UnitId) -> bool {
        self.state.unit(id).is_some_and(Unit::is_alive)
    }

    // ========================================================================
    // Damage
    // ========================================================================

    /// One pass of the damage pipeline from `attacker` to `defender`.
    pub(crate) fn strike(
        &mut self,
        attacker: UnitId,
        defender: UnitId,
        profile: &AttackProfile,
    ) -> Option<DamageOutcome> {
        let source = self.state.unit(attacker)?;
        let target = self.state.unit(defender).filter(|u| u.is_alive())?;
        let facing = FacingRelation::between(target.position, target.facing, source.position);
        let outcome = resolve_damage(
            &source.combatant(self.config),
            &target.combatant(self.config),
            profile,
            facing,
            &mut *self.rolls,
        );

        if outcome.missed {
            self.events.push(BattleEvent::Missed {
                source: attacker,
                target: defender,
            });
            return Some(outcome);
        }
        if outcome.immune {
            self.events.push(BattleEvent::Immune { target: defender });
            return Some(outcome);
        }
        if outcome.mp_damage > 0 {
            self.adjust_mp(defender, -outcome.mp_damage);
        }
        self.apply_hp_damage(
            Some(attacker),
            defender,
            outcome.hp_damage,
            outcome.critical,
            facing,
        );
        Some(outcome)
    }

    /// Damage that bypasses the pipeline (traps, execute) but still goes
    /// through shields and death handling.
    pub(crate) fn deal_raw_damage(&mut self, source: Option<UnitId>, target: UnitId, amount: i32) {
        self.apply_hp_damage(source, target, amount, false, FacingRelation::Front);
    }

    fn apply_hp_damage(
        &mut self,
        source: Option<UnitId>,
        target: UnitId,
        amount: i32,
        critical: bool,
        facing: FacingRelation,
    ) {
        let Some(unit) = self.state.unit_mut(target) else {
            return;
        };
        let (remaining, absorbed) = unit.buffs.absorb(amount);
        let lost = unit.lose_hp(remaining);
        let hp_after = unit.hp;
        let woke = lost > 0 && unit.buffs.remove(BuffKind::Sleep).is_some();
        let died = !unit.is_alive();

        if absorbed > 0 {
            self.events.push(BattleEvent::ShieldAbsorbed {
                target,
                amount: absorbed,
            });
        }
        self.events.push(BattleEvent::Damaged {
            source,
            target,
            amount: lost,
            critical,
            facing,
            hp_after,
        });
        if woke {
            self.events.push(BattleEvent::BuffRemoved {
                target,
                buff: BuffKind::Sleep,
            });
        }
        if died {
            self.handle_death(target, source);
        }
    }

    fn execute(&mut self, caster: UnitId, target: UnitId) {
        let Some(unit) = self.state.unit_mut(target) else {
            return;
        };
        let lost = unit.lose_hp(unit.hp);
        self.events.push(BattleEvent::Damaged {
            source: Some(caster),
            target,
            amount: lost,
            critical: false,
            facing: FacingRelation::Front,
            hp_after: 0,
        });
        self.handle_death(target, Some(caster));
    }

    /// Strikes `first`, then hops to the nearest unstruck opponent within the
    /// hop radius of the previous target, scaling by the falloff per hop.
    fn chain(&mut self, source: &Unit, skill: &Skill, effect: &Effect, first: UnitId, bounces: u32) {
        let mut struck = vec![first];
        let mut current = first;
        let mut anchor = self.state.unit(first).map(|u| u.position);
        let profile = attack_profile(skill, effect, effect.magnitude);
        self.strike(source.id, first, &profile);

        for hop in 1..=bounces {
            let Some(from) = anchor else {
                break;
            };
            let next = self
                .state
                .living()
                .filter(|u| u.team != source.team && !u.buffs.is_hidden())
                .filter(|u| !struck.contains(&u.id))
                .filter(|u| u.position.distance(from) <= self.config.chain_hop_radius)
                .min_by_key(|u| u.position.distance(from))
                .map(|u| (u.id, u.position));
            let Some((id, position)) = next else {
                break;
            };
            tracing::trace!(from = %current, to = %id, hop, "chain bounce");
            let magnitude = effect.magnitude * self.config.chain_falloff.powi(hop as i32);
            self.strike(source.id, id, &attack_profile(skill, effect, magnitude));
            struck.push(id);
            current = id;
            anchor = Some(position);
        }
    }

    // ========================================================================
    // Healing and resources
    // ========================================================================

    fn heal_unit(&mut self, id: UnitId, amount: impl FnOnce(&Unit) -> i32) {
        let Some(unit) = self.state.unit_mut(id).filter(|u| u.is_alive()) else {
            return;
        };
        let wanted = amount(unit);
        let healed = unit.heal(wanted);
        let hp_after = unit.hp;
        self.events.push(BattleEvent::Healed {
            target: id,
            amount: healed,
            hp_after,
        });
    }

    /// Changes MP by `delta` and returns the applied change.
    fn adjust_mp(&mut self, id: UnitId, delta: i32) -> i32 {
        let Some(unit) = self.state.unit_mut(id) else {
            return 0;
        };
        let applied = unit.change_mp(delta);
        let mp_after = unit.mp;
        if applied != 0 {
            self.events.push(BattleEvent::MpChanged {
                target: id,
                delta: applied,
                mp_after,
            });
        }
        applied
    }

    /// Explicit gauge edits are not clamped.
    fn adjust_gauge(&mut self, id: UnitId, kind: EffectKind, magnitude: f64) {
        let threshold = self.config.gauge_threshold;
        let Some(unit) = self.state.unit_mut(id) else {
            return;
        };
        match kind {
            EffectKind::GaugeFill => unit.gauge += magnitude,
            EffectKind::GaugeDrain => unit.gauge -= magnitude,
            EffectKind::GaugeSet => unit.gauge = magnitude,
            EffectKind::GaugeMax => unit.gauge = threshold,
            _ => return,
        }
        let gauge = unit.gauge;
        self.events.push(BattleEvent::GaugeChanged { unit: id, gauge });
    }

    fn steal(&mut self, id: UnitId, amount: u32) {
        let Some(unit) = self.state.unit_mut(id) else {
            return;
        };
        let taken = amount.min(unit.gold);
        if taken == 0 {
            return;
        }
        unit.gold -= taken;
        self.state.loot_gold += taken;
        self.events.push(BattleEvent::GoldStolen {
            from: id,
            amount: taken,
        });
    }

    // ========================================================================
    // Positioning
    // ========================================================================

    fn knock_back(&mut self, source: &Unit, id: UnitId, extra: i32) {
        let Some(position) = self.state.unit(id).map(|u| u.position) else {
            return;
        };
        let dest = hex_in_direction(source.position, position, extra, |hex| {
            self.is_open(hex, Some(id))
        });
        self.displace(id, dest);
    }

    /// Drags the target toward the caster until adjacent or blocked.
    fn pull(&mut self, source: &Unit, id: UnitId) {
        let Some(position) = self.state.unit(id).map(|u| u.position) else {
            return;
        };
        let distance = source.position.distance(position);
        if distance <= 1 {
            return;
        }
        let dest = hex_in_direction(source.position, position, 1 - distance as i32, |hex| {
            self.is_open(hex, Some(id))
        });
        self.displace(id, dest);
    }

    fn swap(&mut self, a: UnitId, b: UnitId) {
        let (Some(pa), Some(pb)) = (
            self.state.unit(a).map(|u| u.position),
            self.state.unit(b).map(|u| u.position),
        ) else {
            return;
        };
        self.displace(a, pb);
        self.displace(b, pa);
    }

    /// Puts the caster on the hex directly behind the target, facing it.
    fn move_behind(&mut self, caster: UnitId, target: UnitId) {
        let Some(victim) = self.state.unit(target) else {
            return;
        };
        let behind = victim.position.neighbor(victim.facing.opposite());
        let victim_at = victim.position;
        if !self.is_open(behind, Some(caster)) {
            self.events.info(format!("no room behind {target}"));
            return;
        }
        self.displace(caster, behind);
        if let Some(unit) = self.state.unit_mut(caster)
            && let Some(direction) = behind.direction_to(victim_at)
        {
            unit.facing = direction;
        }
    }

    // ========================================================================
    // Status and utility
    // ========================================================================

    fn apply_status(&mut self, source: &Unit, id: UnitId, kind: BuffKind, effect: &Effect) {
        let Some(target) = self.state.unit(id).filter(|u| u.is_alive()) else {
            return;
        };
        let roll = roll_application(
            kind,
            effect.chance,
            source.caster_power(),
            target.resist_power(),
            target.stats().tenacity,
            self.config,
            &mut *self.rolls,
        );
        match roll {
            StatusRoll::Applied => {
                let duration = effect.duration.max(1);
                let mut buff = Buff::new(kind, duration, effect.magnitude).with_caster(source.id);
                if kind == BuffKind::Shield {
                    buff = buff.with_amount(effect.magnitude);
                }
                let Some(unit) = self.state.unit_mut(id) else {
                    return;
                };
                let refreshed = unit.buffs.apply(buff) == BuffApplication::Refreshed;
                unit.clamp_pools();
                self.events.push(BattleEvent::BuffApplied {
                    target: id,
                    buff: kind,
                    duration,
                    refreshed,
                });
            }
            StatusRoll::Resisted { chance } => self.events.push(BattleEvent::BuffResisted {
                target: id,
                buff: kind,
                chance: Some(chance),
            }),
            StatusRoll::Immune => self.events.push(BattleEvent::BuffResisted {
                target: id,
                buff: kind,
                chance: None,
            }),
        }
    }

    fn strip(&mut self, id: UnitId, kind: BuffKind) {
        let removed = self
            .state
            .unit_mut(id)
            .and_then(|unit| unit.buffs.remove(kind))
            .is_some();
        if removed {
            self.events.push(BattleEvent::BuffRemoved {
                target: id,
                buff: kind,
            });
        }
    }

    fn place_trap(&mut self, source: &Unit, kind: TrapKind, at: Hex, power: f64) {
        if !self.map.is_passable(at) || self.state.trap_at(at).is_some() {
            self.events.info(format!("cannot place a trap at {at}"));
            return;
        }
        self.state.traps.push(Trap {
            position: at,
            kind,
            owner: source.id,
            team: source.team,
            power: power.max(0.0).floor() as i32,
        });
        self.events.push(BattleEvent::TrapPlaced {
            position: at,
            kind,
            owner: source.id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::TerrainKind;
    use crate::hex::Direction;
    use crate::resolver::tests::{Arena, soldier};
    use crate::skill::TargetMode;
    use crate::state::Team;

    /// Player 0 at the origin facing east, enemies facing west toward it.
    fn duel(enemies: &[(u32, Hex)]) -> Arena {
        let mut units = vec![soldier(0, Team::Player, Hex::ORIGIN)];
        units.extend(
            enemies
                .iter()
                .map(|(id, at)| soldier(*id, Team::Enemy, *at).facing(Direction::West)),
        );
        Arena::new(units)
    }

    fn cast(arena: &mut Arena, effect: Effect, at: Hex) {
        let skill = Skill::new("test", effect);
        arena.ctx().apply_effect(UnitId(0), &skill, &effect, at);
    }

    #[test]
    fn frontal_strike_uses_the_pipeline() {
        let mut arena = duel(&[(1, Hex::new(1, 0))]);
        let before = arena.unit(1).hp;
        cast(
            &mut arena,
            Effect::new(EffectKind::Damage, TargetMode::SingleEnemy, 1.0),
            Hex::new(1, 0),
        );
        // 15 atk * 1.2 variance * 100 / 107 def
        assert_eq!(arena.unit(1).hp, before - 16);
    }

    #[test]
    fn back_strikes_always_crit() {
        let mut arena = duel(&[(1, Hex::new(1, 0))]);
        arena.unit_mut(1).facing = Direction::East;
        let before = arena.unit(1).hp;
        cast(
            &mut arena,
            Effect::new(EffectKind::Damage, TargetMode::SingleEnemy, 1.0),
            Hex::new(1, 0),
        );
        assert_eq!(arena.unit(1).hp, before - 27);
        assert!(arena.saw(|e| matches!(e, BattleEvent::Damaged { critical: true, .. })));
    }

    #[test]
    fn shield_pool_absorbs_first() {
        let mut arena = duel(&[(1, Hex::new(1, 0))]);
        arena
            .unit_mut(1)
            .buffs
            .apply(Buff::new(BuffKind::Shield, 3, 10.0).with_amount(10.0));
        let before = arena.unit(1).hp;
        cast(
            &mut arena,
            Effect::new(EffectKind::Damage, TargetMode::SingleEnemy, 1.0),
            Hex::new(1, 0),
        );
        assert_eq!(arena.unit(1).hp, before - 6);
        assert!(!arena.unit(1).has(BuffKind::Shield));
    }

    #[test]
    fn damage_wakes_sleepers() {
        let mut arena = duel(&[(1, Hex::new(1, 0))]);
        arena.unit_mut(1).buffs.apply(Buff::new(BuffKind::Sleep, 3, 0.0));
        cast(
            &mut arena,
            Effect::new(EffectKind::Damage, TargetMode::SingleEnemy, 1.0),
            Hex::new(1, 0),
        );
        assert!(!arena.unit(1).has(BuffKind::Sleep));
    }

    #[test]
    fn chain_falls_off_per_hop() {
        let mut arena = duel(&[(1, Hex::new(1, 0)), (2, Hex::new(3, 0)), (3, Hex::new(-5, 0))]);
        let full = arena.unit(1).hp;
        cast(
            &mut arena,
            Effect::new(EffectKind::ChainDamage { bounces: 3 }, TargetMode::SingleEnemy, 1.0),
            Hex::new(1, 0),
        );
        assert!(arena.unit(1).hp < full);
        assert!(arena.unit(2).hp < full);
        assert!(full - arena.unit(2).hp < full - arena.unit(1).hp);
        // Out of hop radius from the second target.
        assert_eq!(arena.unit(3).hp, full);
    }

    #[test]
    fn execute_finishes_wounded_targets() {
        let mut arena = duel(&[(1, Hex::new(1, 0)), (2, Hex::new(2, 0))]);
        arena.unit_mut(1).hp = 10;
        cast(
            &mut arena,
            Effect::new(EffectKind::Execute { threshold: 0.2 }, TargetMode::SingleEnemy, 1.0),
            Hex::new(1, 0),
        );
        assert!(!arena.unit(1).is_alive());
        assert!(arena.saw(|e| matches!(e, BattleEvent::UnitDied { unit: UnitId(1), killer: Some(UnitId(0)) })));
    }

    #[test]
    fn distance_scaling_grows_with_range() {
        let mut near = duel(&[(1, Hex::new(1, 0))]);
        let mut far = duel(&[(1, Hex::new(4, 0))]);
        let effect = Effect::new(EffectKind::DistanceScaledDamage, TargetMode::SingleEnemy, 1.0);
        cast(&mut near, effect, Hex::new(1, 0));
        cast(&mut far, effect, Hex::new(4, 0));
        assert!(far.unit(1).hp < near.unit(1).hp);
    }

    #[test]
    fn knockback_is_clipped_by_obstacles() {
        let mut arena = duel(&[(1, Hex::new(1, 0))]);
        let shove = Effect::new(EffectKind::Knockback, TargetMode::SingleEnemy, 0.0).with_area(2);
        cast(&mut arena, shove, Hex::new(1, 0));
        assert_eq!(arena.unit(1).position, Hex::new(4, 0));

        let mut blocked = duel(&[(1, Hex::new(1, 0)), (2, Hex::new(3, 0))]);
        cast(&mut blocked, shove, Hex::new(1, 0));
        assert_eq!(blocked.unit(1).position, Hex::new(2, 0));
    }

    #[test]
    fn knockback_pushes_one_past_its_area() {
        let mut arena = duel(&[(1, Hex::new(2, 0))]);
        let shove = Effect::new(EffectKind::Knockback, TargetMode::SingleEnemy, 0.0).with_area(1);
        cast(&mut arena, shove, Hex::new(2, 0));
        assert_eq!(arena.unit(1).position, Hex::new(4, 0));
        assert_eq!(arena.unit(1).position.distance(arena.unit(0).position), 4);
        assert!(arena.saw(|e| matches!(e, BattleEvent::Displaced { unit: UnitId(1), to, .. } if *to == Hex::new(4, 0))));
    }

    #[test]
    fn knockback_stops_at_the_last_free_hex() {
        let shove = Effect::new(EffectKind::Knockback, TargetMode::SingleEnemy, 0.0).with_area(1);

        let mut walled = duel(&[(1, Hex::new(2, 0))]);
        walled.map.set_terrain(Hex::new(4, 0), TerrainKind::Wall);
        cast(&mut walled, shove, Hex::new(2, 0));
        assert_eq!(walled.unit(1).position, Hex::new(3, 0));

        let mut crowded = duel(&[(1, Hex::new(2, 0)), (2, Hex::new(4, 0))]);
        cast(&mut crowded, shove, Hex::new(2, 0));
        assert_eq!(crowded.unit(1).position, Hex::new(3, 0));
        assert_eq!(crowded.unit(2).position, Hex::new(4, 0));

        let mut pinned = duel(&[(1, Hex::new(2, 0))]);
        pinned.map.set_terrain(Hex::new(3, 0), TerrainKind::Wall);
        cast(&mut pinned, shove, Hex::new(2, 0));
        assert_eq!(pinned.unit(1).position, Hex::new(2, 0));
    }

    #[test]
    fn pull_stops_adjacent_to_the_caster() {
        let mut arena = duel(&[(1, Hex::new(4, 0))]);
        cast(
            &mut arena,
            Effect::new(EffectKind::Pull, TargetMode::SingleEnemy, 0.0),
            Hex::new(4, 0),
        );
        assert_eq!(arena.unit(1).position, Hex::new(1, 0));
    }

    #[test]
    fn move_behind_flanks_the_target() {
        let mut arena = duel(&[(1, Hex::new(2, 0))]);
        cast(
            &mut arena,
            Effect::new(EffectKind::MoveBehind, TargetMode::SingleEnemy, 0.0),
            Hex::new(2, 0),
        );
        assert_eq!(arena.unit(0).position, Hex::new(3, 0));
        assert_eq!(arena.unit(0).facing, Direction::West);
    }

    #[test]
    fn statuses_roll_and_refresh() {
        let mut arena = duel(&[(1, Hex::new(1, 0))]);
        let poison = Effect::new(
            EffectKind::Status { buff: BuffKind::Poison },
            TargetMode::SingleEnemy,
            5.0,
        )
        .with_duration(2);
        cast(&mut arena, poison, Hex::new(1, 0));
        cast(&mut arena, poison, Hex::new(1, 0));
        assert_eq!(arena.unit(1).buffs.len(), 1);
        assert!(arena.saw(|e| matches!(e, BattleEvent::BuffApplied { refreshed: true, .. })));

        let doomed = poison.with_chance(40.0);
        arena.unit_mut(1).buffs.clear();
        cast(&mut arena, doomed, Hex::new(1, 0));
        assert!(!arena.unit(1).has(BuffKind::Poison));
        assert!(arena.saw(|e| matches!(e, BattleEvent::BuffResisted { chance: Some(c), .. } if *c == 40.0)));
    }

    #[test]
    fn gauge_edits_are_unclamped() {
        let mut arena = duel(&[(1, Hex::new(1, 0))]);
        cast(
            &mut arena,
            Effect::new(EffectKind::GaugeDrain, TargetMode::SingleEnemy, 30.0),
            Hex::new(1, 0),
        );
        assert_eq!(arena.unit(1).gauge, -30.0);
        cast(
            &mut arena,
            Effect::new(EffectKind::GaugeMax, TargetMode::SelfOnly, 0.0),
            Hex::ORIGIN,
        );
        assert_eq!(arena.unit(0).gauge, 100.0);
    }

    #[test]
    fn steal_and_traps() {
        let mut arena = duel(&[(1, Hex::new(1, 0))]);
        arena.unit_mut(1).gold = 7;
        cast(
            &mut arena,
            Effect::new(EffectKind::Steal, TargetMode::SingleEnemy, 10.0),
            Hex::new(1, 0),
        );
        assert_eq!(arena.state.loot_gold, 7);
        assert_eq!(arena.unit(1).gold, 0);

        let spike = Effect::new(
            EffectKind::PlaceTrap { trap: TrapKind::Spike },
            TargetMode::SelfOnly,
            15.0,
        );
        cast(&mut arena, spike, Hex::new(0, 2));
        assert_eq!(arena.state.trap_at(Hex::new(0, 2)).map(|t| t.power), Some(15));
    }

    #[test]
    fn reveal_and_cleanse() {
        let mut arena = duel(&[(1, Hex::new(2, 0))]);
        arena.unit_mut(1).buffs.apply(Buff::new(BuffKind::Stealth, 3, 0.0));
        cast(
            &mut arena,
            Effect::new(EffectKind::RevealStealth, TargetMode::Area, 0.0).with_area(1),
            Hex::new(2, 0),
        );
        assert!(!arena.unit(1).has(BuffKind::Stealth));

        arena.unit_mut(0).buffs.apply(Buff::new(BuffKind::Poison, 3, 2.0));
        arena.unit_mut(0).buffs.apply(Buff::new(BuffKind::Haste, 3, 2.0));
        cast(
            &mut arena,
            Effect::new(EffectKind::Cleanse, TargetMode::SelfOnly, 0.0),
            Hex::ORIGIN,
        );
        assert!(!arena.unit(0).has(BuffKind::Poison));
        assert!(arena.unit(0).has(BuffKind::Haste));
    }

    #[test]
    fn unknown_effects_only_warn() {
        let mut arena = duel(&[(1, Hex::new(1, 0))]);
        let before = arena.state.clone();
        cast(
            &mut arena,
            Effect::new(EffectKind::Unknown, TargetMode::SingleEnemy, 1.0),
            Hex::new(1, 0),
        );
        assert_eq!(arena.state, before);
        assert!(arena.saw(|e| matches!(e, BattleEvent::Log { level: crate::engine::LogLevel::Warn, .. })));
    }
}
