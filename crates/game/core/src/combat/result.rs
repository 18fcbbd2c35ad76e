//! Combat result types.

use super::hit::FacingRelation;

/// Final output of the damage pipeline for one hit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageOutcome {
    /// HP to subtract (before shield pools).
    pub hp_damage: i32,
    /// MP siphoned by a mana shield.
    pub mp_damage: i32,
    pub critical: bool,
    pub missed: bool,
    pub immune: bool,
    pub facing: FacingRelation,
}

impl DamageOutcome {
    pub fn miss(facing: FacingRelation) -> Self {
        Self {
            missed: true,
            facing,
            ..Self::default()
        }
    }

    /// True when the hit connected and dealt damage to HP or MP.
    pub fn landed(&self) -> bool {
        !self.missed && !self.immune
    }
}
