//! Derived combat stats.
//!
//! Layers, in order:
//! 1. attribute contribution ([`StatKind::base_value`])
//! 2. flat equipment bonuses whose slot governs the stat
//! 3. passive bonuses gated by level tier
//! 4. flat buff bonuses
//!
//! Buff multipliers apply last. Rate stats (`hit`, `crit`, `eva`,
//! `tenacity`) are clamped at zero; everything else is floored.

use strum::IntoEnumIterator;

use super::attributes::{Attributes, StatKind};
use super::bonus::{Bonus, BonusSet};
use crate::state::{EquipmentItem, Passive, PassiveKind};
use crate::status::{BuffKind, BuffList};

/// Final stats used by combat formulas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatStats {
    pub atk_phys: i32,
    pub atk_mag: i32,
    pub def: i32,
    pub res: i32,
    pub hit: f64,
    pub crit: f64,
    pub eva: f64,
    pub tenacity: f64,
    pub hp_max: i32,
    pub mp_max: i32,
    pub spd: i32,
    /// Movement budget for this turn.
    pub movement: u32,
    /// Added to the base critical multiplier.
    pub crit_damage_bonus: f64,
    /// Fraction of incoming damage blocked (0..=1).
    pub block: f64,
    /// Fraction of the defender's defense ignored (0..=1).
    pub penetration: f64,
}

impl CombatStats {
    pub fn get(&self, stat: StatKind) -> f64 {
        match stat {
            StatKind::AtkPhys => self.atk_phys as f64,
            StatKind::AtkMag => self.atk_mag as f64,
            StatKind::Def => self.def as f64,
            StatKind::Res => self.res as f64,
            StatKind::Hit => self.hit,
            StatKind::Crit => self.crit,
            StatKind::Eva => self.eva,
            StatKind::Tenacity => self.tenacity,
            StatKind::HpMax => self.hp_max as f64,
            StatKind::MpMax => self.mp_max as f64,
            StatKind::Spd => self.spd as f64,
        }
    }

    fn set(&mut self, stat: StatKind, value: f64) {
        let floored = value.floor() as i32;
        match stat {
            StatKind::AtkPhys => self.atk_phys = floored,
            StatKind::AtkMag => self.atk_mag = floored,
            StatKind::Def => self.def = floored,
            StatKind::Res => self.res = floored,
            StatKind::Hit => self.hit = value.max(0.0),
            StatKind::Crit => self.crit = value.max(0.0),
            StatKind::Eva => self.eva = value.max(0.0),
            StatKind::Tenacity => self.tenacity = value.max(0.0),
            StatKind::HpMax => self.hp_max = floored.max(1),
            StatKind::MpMax => self.mp_max = floored.max(0),
            StatKind::Spd => self.spd = floored,
        }
    }
}

/// Everything a unit contributes to its derived stats.
#[derive(Clone, Copy, Debug)]
pub struct StatInputs<'a> {
    pub attributes: &'a Attributes,
    pub level: u32,
    pub base_hp: i32,
    pub base_mp: i32,
    pub base_movement: u32,
    pub equipment: &'a [EquipmentItem],
    pub passives: &'a [Passive],
    pub buffs: &'a BuffList,
}

impl StatInputs<'_> {
    pub fn compute(&self) -> CombatStats {
        let mut bonuses = BonusSet::new();
        let mut stats = CombatStats::default();

        for item in self.equipment {
            bonuses.add(item.stat, Bonus::Flat(item.bonus_for(item.stat)));
        }

        for passive in self.passives.iter().filter(|p| p.is_active(self.level)) {
            match passive.kind {
                PassiveKind::StatBonus { stat, amount } => bonuses.add(stat, Bonus::Flat(amount)),
                PassiveKind::CritDamage { bonus } => stats.crit_damage_bonus += bonus,
                PassiveKind::Block { ratio } => stats.block += ratio,
                PassiveKind::Penetration { ratio } => stats.penetration += ratio,
                PassiveKind::ReviveOnDeath { .. } => {}
            }
        }

        for buff in self.buffs.iter() {
            for (stat, bonus) in buff.kind.stat_bonuses(buff.magnitude) {
                bonuses.add(stat, bonus);
            }
        }

        for stat in StatKind::iter() {
            let base = stat.base_value(self.attributes, self.base_hp, self.base_mp);
            stats.set(stat, bonuses.stack(stat).apply(base));
        }

        stats.crit_damage_bonus += self.buffs.magnitude(BuffKind::CritDamageUp);
        stats.block = (stats.block + self.buffs.magnitude(BuffKind::Block)).clamp(0.0, 1.0);
        stats.penetration = stats.penetration.clamp(0.0, 1.0);
        stats.movement = self.movement();
        stats
    }

    fn movement(&self) -> u32 {
        if self.buffs.has(BuffKind::Root) {
            return 0;
        }
        let mut movement = self.base_movement as i64;
        if self.buffs.has(BuffKind::Haste) {
            movement += 1;
        }
        if self.buffs.has(BuffKind::Slow) {
            movement -= 1;
        }
        movement.max(0) as u32
    }
}
