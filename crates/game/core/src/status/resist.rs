//! Debuff application rolls.

use super::BuffKind;
use crate::config::BattleConfig;
use crate::env::RollSource;

/// Result of trying to apply a status.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatusRoll {
    Applied,
    /// The roll failed against `chance` percent.
    Resisted { chance: f64 },
    /// Target tenacity is above the immunity threshold.
    Immune,
}

/// `level + 0.5 * (a + b)`. Casters use `(int, dex)`, targets `(vit, luk)`.
pub fn status_power(level: u32, a: i32, b: i32) -> f64 {
    level as f64 + 0.5 * (a + b) as f64
}

/// `clamp(75 + (caster - target), 10, 90)` in percent.
pub fn application_chance(caster_power: f64, target_power: f64) -> f64 {
    (BattleConfig::RESIST_BASE + (caster_power - target_power))
        .clamp(BattleConfig::RESIST_MIN, BattleConfig::RESIST_MAX)
}

/// Rolls whether `kind` lands.
///
/// Buffs never roll. An explicit `chance_override` (percent) bypasses the
/// clamp but not tenacity immunity.
pub fn roll_application(
    kind: BuffKind,
    chance_override: Option<f64>,
    caster_power: f64,
    target_power: f64,
    target_tenacity: f64,
    config: &BattleConfig,
    rolls: &mut (impl RollSource + ?Sized),
) -> StatusRoll {
    if !kind.is_debuff() {
        return StatusRoll::Applied;
    }
    if target_tenacity > config.tenacity_immunity {
        return StatusRoll::Immune;
    }
    let chance = chance_override.unwrap_or_else(|| application_chance(caster_power, target_power));
    if rolls.chance(chance) {
        StatusRoll::Applied
    } else {
        StatusRoll::Resisted { chance }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedRolls;

    #[test]
    fn chance_follows_power_difference() {
        assert_eq!(application_chance(30.0, 20.0), 85.0);
        assert_eq!(application_chance(100.0, 0.0), 90.0);
        assert_eq!(application_chance(0.0, 100.0), 10.0);
    }

    #[test]
    fn power_mixes_level_and_stats() {
        assert_eq!(status_power(10, 20, 20), 30.0);
    }

    #[test]
    fn roll_against_chance() {
        let config = BattleConfig::default();
        let mut low = ScriptedRolls::constant(0.84);
        let mut high = ScriptedRolls::constant(0.86);
        assert_eq!(
            roll_application(BuffKind::Poison, None, 30.0, 20.0, 10.0, &config, &mut low),
            StatusRoll::Applied
        );
        assert_eq!(
            roll_application(BuffKind::Poison, None, 30.0, 20.0, 10.0, &config, &mut high),
            StatusRoll::Resisted { chance: 85.0 }
        );
    }

    #[test]
    fn override_bypasses_clamp_and_buffs_never_roll() {
        let config = BattleConfig::default();
        let mut rolls = ScriptedRolls::constant(0.95);
        assert_eq!(
            roll_application(BuffKind::Stun, Some(100.0), 0.0, 50.0, 0.0, &config, &mut rolls),
            StatusRoll::Applied
        );
        assert_eq!(
            roll_application(BuffKind::Haste, None, 0.0, 0.0, 500.0, &config, &mut rolls),
            StatusRoll::Applied
        );
    }

    #[test]
    fn high_tenacity_is_immune() {
        let config = BattleConfig::default();
        let mut rolls = ScriptedRolls::constant(0.0);
        assert_eq!(
            roll_application(BuffKind::Stun, Some(100.0), 0.0, 0.0, 101.0, &config, &mut rolls),
            StatusRoll::Immune
        );
    }
}
