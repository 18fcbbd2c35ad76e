//! Facing, accuracy and critical-hit chances.

use crate::config::BattleConfig;
use crate::hex::{Direction, Hex};

/// Where an attack lands relative to the defender's facing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FacingRelation {
    #[default]
    Front,
    Flank,
    Back,
}

impl FacingRelation {
    /// Relation for an attack from `attacker` against a defender standing on
    /// `defender` and facing `facing`.
    pub fn between(defender: Hex, facing: Direction, attacker: Hex) -> Self {
        let Some(toward_attacker) = defender.direction_to(attacker) else {
            return FacingRelation::Front;
        };
        match facing.rotational_distance(toward_attacker) {
            0 | 1 => FacingRelation::Front,
            2 => FacingRelation::Flank,
            _ => FacingRelation::Back,
        }
    }

    /// Multiplier applied to the defender's defense and evasion.
    pub const fn guard_factor(self) -> f64 {
        match self {
            FacingRelation::Front => 1.0,
            FacingRelation::Flank => 0.5,
            FacingRelation::Back => 0.0,
        }
    }

    pub const fn crit_bonus(self) -> f64 {
        match self {
            FacingRelation::Back => BattleConfig::BACK_CRIT_BONUS,
            _ => 0.0,
        }
    }
}

/// `hit - eva * guard_factor`, in percent.
pub fn hit_chance(hit: f64, eva: f64, facing: FacingRelation) -> f64 {
    hit - eva * facing.guard_factor()
}

/// Crit chance in percent, including the back-attack bonus.
pub fn crit_chance(crit: f64, facing: FacingRelation) -> f64 {
    crit + facing.crit_bonus()
}
