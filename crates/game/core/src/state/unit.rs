use std::collections::BTreeMap;
use std::fmt;

use crate::combat::{Combatant, Element};
use crate::config::BattleConfig;
use crate::error::CommandError;
use crate::hex::{Direction, Hex};
use crate::skill::Skill;
use crate::state::{EquipmentItem, Passive, PassiveKind};
use crate::stats::{Attributes, CombatStats, StatInputs};
use crate::status::{BuffKind, BuffList};

/// Battle-scoped unit identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a persistent roster member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RosterId(pub u32);

impl fmt::Display for RosterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "roster-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    pub const fn opponent(self) -> Team {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }
}

/// A combatant on the field.
///
/// Derived stats are never stored; [`Unit::stats`] recomputes them from
/// attributes, equipment, passives and buffs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    /// Catalog key this unit was built from.
    pub template: String,
    pub name: String,
    pub team: Team,
    pub roster_id: Option<RosterId>,

    pub position: Hex,
    pub facing: Direction,

    pub attributes: Attributes,
    pub level: u32,
    pub xp: u32,
    pub stat_points: u32,
    pub base_hp: i32,
    pub base_mp: i32,
    pub base_movement: u32,
    pub attack_range: u32,
    pub element: Element,

    pub hp: i32,
    pub mp: i32,
    pub gauge: f64,
    pub buffs: BuffList,

    pub skills: Vec<Skill>,
    pub passives: Vec<Passive>,
    pub equipment: Vec<EquipmentItem>,
    pub cooldowns: BTreeMap<String, u32>,
    pub gold: u32,
    pub revive_used: bool,
}

impl Unit {
    pub fn new(id: UnitId, name: impl Into<String>, team: Team, attributes: Attributes) -> Self {
        let name = name.into();
        let mut unit = Self {
            id,
            template: name.clone(),
            name,
            team,
            roster_id: None,
            position: Hex::ORIGIN,
            facing: Direction::East,
            attributes,
            level: 1,
            xp: 0,
            stat_points: 0,
            base_hp: 0,
            base_mp: 0,
            base_movement: 3,
            attack_range: 1,
            element: Element::Neutral,
            hp: 0,
            mp: 0,
            gauge: 0.0,
            buffs: BuffList::new(),
            skills: Vec::new(),
            passives: Vec::new(),
            equipment: Vec::new(),
            cooldowns: BTreeMap::new(),
            gold: 0,
            revive_used: false,
        };
        unit.restore_full();
        unit
    }

    pub fn at(mut self, position: Hex) -> Self {
        self.position = position;
        self
    }

    pub fn facing(mut self, facing: Direction) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    pub fn with_movement(mut self, movement: u32) -> Self {
        self.base_movement = movement;
        self
    }

    pub fn with_attack_range(mut self, range: u32) -> Self {
        self.attack_range = range.max(1);
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn with_passive(mut self, passive: Passive) -> Self {
        self.passives.push(passive);
        self
    }

    pub fn with_equipment(mut self, item: EquipmentItem) -> Self {
        self.equipment.push(item);
        self.restore_full();
        self
    }

    pub fn with_gold(mut self, gold: u32) -> Self {
        self.gold = gold;
        self
    }

    pub fn with_base_pools(mut self, base_hp: i32, base_mp: i32) -> Self {
        self.base_hp = base_hp;
        self.base_mp = base_mp;
        self.restore_full();
        self
    }

    pub fn stat_inputs(&self) -> StatInputs<'_> {
        StatInputs {
            attributes: &self.attributes,
            level: self.level,
            base_hp: self.base_hp,
            base_mp: self.base_mp,
            base_movement: self.base_movement,
            equipment: &self.equipment,
            passives: &self.passives,
            buffs: &self.buffs,
        }
    }

    pub fn stats(&self) -> CombatStats {
        self.stat_inputs().compute()
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn hp_ratio(&self) -> f64 {
        let max = self.stats().hp_max.max(1);
        self.hp as f64 / max as f64
    }

    pub fn restore_full(&mut self) {
        let stats = self.stats();
        self.hp = stats.hp_max;
        self.mp = stats.mp_max;
    }

    /// Re-establishes `0 <= hp <= hp_max` and `0 <= mp <= mp_max`.
    pub fn clamp_pools(&mut self) {
        let stats = self.stats();
        self.hp = self.hp.clamp(0, stats.hp_max);
        self.mp = self.mp.clamp(0, stats.mp_max);
    }

    /// Heals up to max HP, returning the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.stats().hp_max);
        self.hp - before
    }

    /// Subtracts HP, returning the amount actually lost.
    pub fn lose_hp(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0)).max(0);
        before - self.hp
    }

    /// Adds (or with a negative delta removes) MP, returning the change.
    pub fn change_mp(&mut self, delta: i32) -> i32 {
        let before = self.mp;
        self.mp = (self.mp + delta).clamp(0, self.stats().mp_max);
        self.mp - before
    }

    pub fn has(&self, kind: BuffKind) -> bool {
        self.buffs.has(kind)
    }

    /// Known skill by id, including the implicit basic attack.
    pub fn skill(&self, id: &str) -> Option<Skill> {
        if id == Skill::BASIC_ATTACK {
            return Some(self.basic_attack());
        }
        self.skills.iter().find(|s| s.id == id).cloned()
    }

    pub fn basic_attack(&self) -> Skill {
        Skill::basic_attack(self.attack_range, self.element)
    }

    pub fn cooldown(&self, id: &str) -> u32 {
        self.cooldowns.get(id).copied().unwrap_or(0)
    }

    /// Counts every cooldown down by one turn.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });
    }

    /// Checks everything about casting `skill` that does not depend on the
    /// target: tier, MP, gauge, cooldown, silence and crowd control.
    pub fn check_usable(&self, skill: &Skill) -> Result<(), CommandError> {
        if self.buffs.is_crowd_controlled() {
            return Err(CommandError::Incapacitated);
        }
        if skill.is_basic_attack() {
            return Ok(());
        }
        if self.level < skill.tier {
            return Err(CommandError::TierLocked {
                skill: skill.id.clone(),
                tier: skill.tier,
            });
        }
        if self.has(BuffKind::Silence) {
            return Err(CommandError::Silenced);
        }
        let turns = self.cooldown(&skill.id);
        if turns > 0 {
            return Err(CommandError::OnCooldown {
                skill: skill.id.clone(),
                turns,
            });
        }
        if (self.mp as i64) < skill.mp_cost as i64 {
            return Err(CommandError::InsufficientMp {
                needed: skill.mp_cost,
                available: self.mp,
            });
        }
        if self.gauge < skill.gauge_cost {
            return Err(CommandError::InsufficientGauge {
                cost: skill.gauge_cost,
                gauge: self.gauge,
            });
        }
        Ok(())
    }

    /// Every skill (basic attack last) that passes [`Self::check_usable`].
    pub fn usable_skills(&self) -> Vec<Skill> {
        let mut usable: Vec<Skill> = self
            .skills
            .iter()
            .filter(|skill| self.check_usable(skill).is_ok())
            .cloned()
            .collect();
        let basic = self.basic_attack();
        if self.check_usable(&basic).is_ok() {
            usable.push(basic);
        }
        usable
    }

    /// Snapshot of this unit's side of the damage pipeline.
    pub fn combatant(&self, config: &BattleConfig) -> Combatant {
        let multiplier = |kind: BuffKind| {
            self.buffs
                .get(kind)
                .map_or(1.0, |buff| 1.0 + buff.magnitude.max(0.0))
        };
        Combatant {
            stats: self.stats(),
            element: self.element,
            volatility: self.attributes.vol,
            mp: self.mp,
            armor_break: self.buffs.magnitude(BuffKind::ArmorBreak),
            mana_shield: self.buffs.get(BuffKind::ManaShield).map(|buff| {
                if buff.magnitude > 0.0 {
                    buff.magnitude
                } else {
                    config.mana_shield_fraction
                }
            }),
            damage_taken: multiplier(BuffKind::Curse) * multiplier(BuffKind::Vulnerable),
            invulnerable: self.has(BuffKind::Invulnerable),
        }
    }

    /// HP ratio granted by an unused, active revive passive.
    pub fn revive_ratio(&self) -> Option<f64> {
        if self.revive_used {
            return None;
        }
        self.passives
            .iter()
            .filter(|p| p.is_active(self.level))
            .find_map(|p| match p.kind {
                PassiveKind::ReviveOnDeath { hp_ratio } => Some(hp_ratio),
                _ => None,
            })
    }

    /// Adds experience and applies level-ups. Returns the number of levels
    /// gained; leftover experience carries over.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        loop {
            let needed = self.level * BattleConfig::XP_PER_LEVEL;
            if self.xp < needed {
                break;
            }
            self.xp -= needed;
            self.level += 1;
            self.stat_points += BattleConfig::STAT_POINTS_PER_LEVEL;
            gained += 1;
        }
        gained
    }

    /// Power used by status application rolls when this unit casts.
    pub fn caster_power(&self) -> f64 {
        crate::status::status_power(self.level, self.attributes.int, self.attributes.dex)
    }

    /// Power used by status application rolls when this unit is targeted.
    pub fn resist_power(&self) -> f64 {
        crate::status::status_power(self.level, self.attributes.vit, self.attributes.luk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::{Effect, EffectKind, TargetMode};
    use crate::status::Buff;

    fn knight() -> Unit {
        Unit::new(UnitId(1), "knight", Team::Player, Attributes::uniform(10))
    }

    fn fireball() -> Skill {
        Skill::new("fireball", Effect::new(EffectKind::Damage, TargetMode::SingleEnemy, 1.5))
            .with_costs(10, 100.0)
            .with_range(3)
            .with_cooldown(2)
    }

    #[test]
    fn fresh_units_start_full() {
        let unit = knight();
        let stats = unit.stats();
        assert_eq!(unit.hp, stats.hp_max);
        assert_eq!(unit.mp, stats.mp_max);
        assert_eq!(unit.hp_ratio(), 1.0);
    }

    #[test]
    fn usability_checks() {
        let mut unit = knight().with_skill(fireball());
        unit.gauge = 100.0;
        let skill = fireball();
        assert!(unit.check_usable(&skill).is_ok());

        unit.cooldowns.insert("fireball".into(), 1);
        assert!(matches!(unit.check_usable(&skill), Err(CommandError::OnCooldown { turns: 1, .. })));
        unit.tick_cooldowns();
        assert!(unit.check_usable(&skill).is_ok());

        unit.mp = 5;
        assert!(matches!(unit.check_usable(&skill), Err(CommandError::InsufficientMp { .. })));
        unit.mp = 50;

        unit.buffs.apply(Buff::new(BuffKind::Silence, 1, 0.0));
        assert_eq!(unit.check_usable(&skill), Err(CommandError::Silenced));
        assert!(unit.check_usable(&unit.basic_attack()).is_ok());

        unit.buffs.apply(Buff::new(BuffKind::Stun, 1, 0.0));
        assert_eq!(unit.check_usable(&unit.basic_attack()), Err(CommandError::Incapacitated));
    }

    #[test]
    fn tier_gate() {
        let mut unit = knight();
        unit.gauge = 100.0;
        let locked = fireball().with_tier(3);
        assert!(matches!(unit.check_usable(&locked), Err(CommandError::TierLocked { tier: 3, .. })));
    }

    #[test]
    fn level_up_carries_over_experience() {
        let mut unit = knight();
        assert_eq!(unit.gain_xp(350), 2);
        assert_eq!(unit.level, 3);
        assert_eq!(unit.xp, 50);
        assert_eq!(unit.stat_points, 6);
    }

    #[test]
    fn pools_stay_in_bounds() {
        let mut unit = knight();
        assert_eq!(unit.lose_hp(10_000), unit.stats().hp_max);
        assert_eq!(unit.hp, 0);
        assert!(!unit.is_alive());
        let max = unit.stats().hp_max;
        assert_eq!(unit.heal(10_000), max);
        assert_eq!(unit.change_mp(-10_000), -unit.stats().mp_max);
        assert_eq!(unit.mp, 0);
    }

    #[test]
    fn curse_and_vulnerable_stack() {
        let mut unit = knight();
        unit.buffs.apply(Buff::new(BuffKind::Curse, 2, 0.2));
        unit.buffs.apply(Buff::new(BuffKind::Vulnerable, 2, 0.5));
        let combatant = unit.combatant(&BattleConfig::default());
        assert!((combatant.damage_taken - 1.8).abs() < 1e-9);
    }
}
