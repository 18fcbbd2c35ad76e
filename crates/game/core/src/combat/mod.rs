//! Damage pipeline and combat rolls.
//!
//! Pure functions only: callers pass stats snapshots and a [`RollSource`],
//! and receive a [`DamageOutcome`] to apply. Each pipeline stage is exposed
//! on its own so it can be tested in isolation.
//!
//! [`RollSource`]: crate::env::RollSource

pub mod damage;
pub mod hit;
pub mod result;

pub use damage::{AttackProfile, BaseAttack, Combatant, expected_damage, resolve_damage};
pub use hit::{FacingRelation, crit_chance, hit_chance};
pub use result::DamageOutcome;

use crate::config::BattleConfig;

/// Which attack stat a skill draws on and which defense mitigates it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageCategory {
    #[default]
    Physical,
    Magic,
    Holy,
    Dark,
}

/// Elemental affinity of units and skills.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::EnumIter,
    strum::EnumString,
    strum::AsRefStr,
    strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    #[default]
    Neutral,
    Fire,
    Water,
    Nature,
}

impl Element {
    /// The element this one beats.
    pub const fn beats(self) -> Option<Element> {
        match self {
            Element::Neutral => None,
            Element::Water => Some(Element::Fire),
            Element::Fire => Some(Element::Nature),
            Element::Nature => Some(Element::Water),
        }
    }

    /// Damage multiplier when `self` attacks `defender`.
    pub fn affinity(self, defender: Element) -> f64 {
        if self.beats() == Some(defender) {
            BattleConfig::ELEMENT_ADVANTAGE
        } else if defender.beats() == Some(self) {
            BattleConfig::ELEMENT_DISADVANTAGE
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elemental_triangle() {
        assert_eq!(Element::Water.affinity(Element::Fire), 1.3);
        assert_eq!(Element::Fire.affinity(Element::Water), 0.8);
        assert_eq!(Element::Nature.affinity(Element::Water), 1.3);
        assert_eq!(Element::Fire.affinity(Element::Fire), 1.0);
        assert_eq!(Element::Neutral.affinity(Element::Fire), 1.0);
        assert_eq!(Element::Fire.affinity(Element::Neutral), 1.0);
    }
}
