//! The ordered damage pipeline.
//!
//! ```text
//!  1 base attack by category        7 mitigation (defense, penetration)
//!  2 variance [0.9, 1 + vol*0.05]   8 critical
//!  3 skill magnitude                9 block
//!  4 facing                        10 mana-shield siphon
//!  5 elemental affinity            11 curse / vulnerable
//!  6 hit roll                      12 floor, minimum 1 HP, immunity
//! ```

use super::hit::{FacingRelation, crit_chance, hit_chance};
use super::result::DamageOutcome;
use super::{DamageCategory, Element};
use crate::config::BattleConfig;
use crate::env::RollSource;
use crate::stats::CombatStats;

/// Stat that seeds stage 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BaseAttack {
    /// Attack stat selected by the damage category.
    #[default]
    Category,
    /// The attacker's own defense.
    Defense,
}

/// Skill-side inputs to the pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackProfile {
    pub category: DamageCategory,
    pub element: Element,
    pub magnitude: f64,
    pub sure_hit: bool,
    /// Fraction of defense ignored, added to the attacker's own penetration.
    pub penetration: f64,
    pub base: BaseAttack,
}

impl AttackProfile {
    pub fn new(category: DamageCategory, element: Element, magnitude: f64) -> Self {
        Self {
            category,
            element,
            magnitude,
            sure_hit: false,
            penetration: 0.0,
            base: BaseAttack::Category,
        }
    }

    pub fn sure_hit(mut self) -> Self {
        self.sure_hit = true;
        self
    }

    pub fn with_penetration(mut self, penetration: f64) -> Self {
        self.penetration = penetration;
        self
    }

    pub fn with_base(mut self, base: BaseAttack) -> Self {
        self.base = base;
        self
    }
}

/// Unit-side inputs to the pipeline, captured before the hit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Combatant {
    pub stats: CombatStats,
    pub element: Element,
    pub volatility: i32,
    pub mp: i32,
    /// Flat defense removed after penetration.
    pub armor_break: f64,
    /// Fraction of damage routed into MP, when a mana shield is active.
    pub mana_shield: Option<f64>,
    /// Product of curse and vulnerability multipliers.
    pub damage_taken: f64,
    pub invulnerable: bool,
}

/// Stage 1.
pub fn base_attack(stats: &CombatStats, category: DamageCategory, base: BaseAttack) -> f64 {
    if base == BaseAttack::Defense {
        return stats.def as f64;
    }
    match category {
        DamageCategory::Physical => stats.atk_phys as f64,
        DamageCategory::Magic | DamageCategory::Dark => stats.atk_mag as f64,
        DamageCategory::Holy => (stats.atk_phys + stats.atk_mag) as f64 / 2.0,
    }
}

/// Stage 2: maps a unit roll onto `[0.9, 1.0 + vol * 0.05]`.
pub fn variance(volatility: i32, roll: f64) -> f64 {
    let low = 0.9;
    let high = 1.0 + volatility.max(0) as f64 * 0.05;
    low + (high - low) * roll
}

/// Stage 7: `damage * 100 / (100 + effDef)`.
pub fn mitigate(
    damage: f64,
    defense: f64,
    facing: FacingRelation,
    penetration: f64,
    armor_break: f64,
) -> f64 {
    let effective =
        (defense * facing.guard_factor() * (1.0 - penetration.clamp(0.0, 1.0)) - armor_break).max(0.0);
    damage * 100.0 / (100.0 + effective)
}

/// Stage 8 multiplier.
pub fn crit_multiplier(bonus: f64) -> f64 {
    BattleConfig::BASE_CRIT_MULTIPLIER + bonus
}

/// Stage 10: returns `(hp_part, mp_part)`.
pub fn siphon_to_mana(damage: f64, fraction: f64, mp: i32) -> (f64, i32) {
    if mp <= 0 || fraction <= 0.0 {
        return (damage, 0);
    }
    let siphoned = ((damage * fraction.min(1.0)).floor() as i32).min(mp).max(0);
    (damage - siphoned as f64, siphoned)
}

fn defense_for(category: DamageCategory, stats: &CombatStats) -> f64 {
    match category {
        DamageCategory::Physical => stats.def as f64,
        _ => stats.res as f64,
    }
}

/// Runs the full pipeline for one hit.
pub fn resolve_damage(
    attacker: &Combatant,
    defender: &Combatant,
    profile: &AttackProfile,
    facing: FacingRelation,
    rolls: &mut (impl RollSource + ?Sized),
) -> DamageOutcome {
    let mut damage = base_attack(&attacker.stats, profile.category, profile.base);
    damage *= variance(attacker.volatility, rolls.unit());
    damage *= profile.magnitude;
    damage *= profile.element.affinity(defender.element);

    if !profile.sure_hit && facing != FacingRelation::Back {
        let chance = hit_chance(attacker.stats.hit, defender.stats.eva, facing);
        if !rolls.chance(chance) {
            return DamageOutcome::miss(facing);
        }
    }

    damage = mitigate(
        damage,
        defense_for(profile.category, &defender.stats),
        facing,
        profile.penetration + attacker.stats.penetration,
        defender.armor_break,
    );

    let critical = facing == FacingRelation::Back
        || rolls.chance(crit_chance(attacker.stats.crit, facing));
    if critical {
        damage *= crit_multiplier(attacker.stats.crit_damage_bonus);
    }

    damage *= 1.0 - defender.stats.block;

    let (hp_part, mp_damage) = match defender.mana_shield {
        Some(fraction) => siphon_to_mana(damage, fraction, defender.mp),
        None => (damage, 0),
    };
    let hp_part = hp_part * defender.damage_taken;

    if defender.invulnerable {
        return DamageOutcome {
            critical,
            immune: true,
            facing,
            ..DamageOutcome::default()
        };
    }

    // A landed hit always costs at least 1 HP. When the shield would soak
    // the whole hit, that point is taken back out of the siphoned MP.
    let mut hp_damage = hp_part.max(0.0).floor() as i32;
    let mut mp_damage = mp_damage;
    if hp_damage < 1 {
        hp_damage = 1;
        mp_damage = (mp_damage - 1).max(0);
    }

    DamageOutcome {
        hp_damage,
        mp_damage,
        critical,
        missed: false,
        immune: false,
        facing,
    }
}

/// Deterministic estimate used by AI target selection: mean variance, no
/// miss, crit only when it is guaranteed.
pub fn expected_damage(
    attacker: &Combatant,
    defender: &Combatant,
    profile: &AttackProfile,
    facing: FacingRelation,
) -> i32 {
    if defender.invulnerable {
        return 0;
    }
    let mut damage = base_attack(&attacker.stats, profile.category, profile.base);
    damage *= variance(attacker.volatility, 0.5);
    damage *= profile.magnitude;
    damage *= profile.element.affinity(defender.element);
    damage = mitigate(
        damage,
        defense_for(profile.category, &defender.stats),
        facing,
        profile.penetration + attacker.stats.penetration,
        defender.armor_break,
    );
    if facing == FacingRelation::Back {
        damage *= crit_multiplier(attacker.stats.crit_damage_bonus);
    }
    damage *= (1.0 - defender.stats.block) * defender.damage_taken;
    (damage.floor() as i32).max(1)
}
