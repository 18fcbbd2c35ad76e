/// Battle configuration constants and tunable parameters.
///
/// Capacity limits are compile-time constants because they size fixed
/// containers. Everything else is a runtime default that hosts may override,
/// typically by loading a `battle.toml` through the content crate.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BattleConfig {
    /// Gauge value at which a unit becomes eligible to act.
    pub gauge_threshold: f64,
    /// Gauge debited when a turn ends after moving without acting.
    pub move_only_cost: f64,
    /// Gauge debited when a turn ends without moving or acting.
    pub idle_cost: f64,
    /// Search radius (from the previous victim) for chain-bounce hops.
    pub chain_hop_radius: u32,
    /// Damage factor applied per chain hop (`falloff ^ hop_index`).
    pub chain_falloff: f64,
    /// Tenacity above which a unit ignores debuffs entirely.
    pub tenacity_immunity: f64,
    /// HP ratio below which auto-play prefers healing an ally.
    pub heal_threshold: f64,
    /// Experience granted per victim level.
    pub xp_per_victim_level: u32,
    /// Experience factor applied when the stage was already cleared.
    pub cleared_stage_xp_factor: f64,
    /// Fraction of incoming damage routed into MP when a mana shield carries
    /// no explicit magnitude.
    pub mana_shield_fraction: f64,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Upper bound on simultaneous buffs per unit (one per kind).
    pub const MAX_BUFFS: usize = 34;

    // ===== fixed rules =====
    /// Terrain cost at or above which a hex cannot be entered.
    pub const IMPASSABLE_COST: u32 = 99;
    /// Base debuff application chance before the power difference.
    pub const RESIST_BASE: f64 = 75.0;
    pub const RESIST_MIN: f64 = 10.0;
    pub const RESIST_MAX: f64 = 90.0;
    pub const BASE_CRIT_MULTIPLIER: f64 = 1.5;
    pub const BACK_CRIT_BONUS: f64 = 30.0;
    pub const ELEMENT_ADVANTAGE: f64 = 1.3;
    pub const ELEMENT_DISADVANTAGE: f64 = 0.8;
    /// Extra damage per hex of distance for distance-scaled effects.
    pub const DISTANCE_DAMAGE_STEP: f64 = 0.15;
    /// Experience needed per level (`level * XP_PER_LEVEL`).
    pub const XP_PER_LEVEL: u32 = 100;
    pub const STAT_POINTS_PER_LEVEL: u32 = 3;
    /// Positioning score for tiles from which the target is in range.
    pub const AI_POSITION_BASE: i32 = 1000;
    pub const AI_IN_RANGE_BONUS: i32 = 100;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_GAUGE_THRESHOLD: f64 = 100.0;
    pub const DEFAULT_MOVE_ONLY_COST: f64 = 50.0;
    pub const DEFAULT_IDLE_COST: f64 = 75.0;
    pub const DEFAULT_CHAIN_HOP_RADIUS: u32 = 3;
    pub const DEFAULT_CHAIN_FALLOFF: f64 = 0.8;
    pub const DEFAULT_TENACITY_IMMUNITY: f64 = 100.0;
    pub const DEFAULT_HEAL_THRESHOLD: f64 = 0.5;
    pub const DEFAULT_XP_PER_VICTIM_LEVEL: u32 = 20;
    pub const DEFAULT_CLEARED_STAGE_XP_FACTOR: f64 = 0.25;
    pub const DEFAULT_MANA_SHIELD_FRACTION: f64 = 0.5;

    pub fn new() -> Self {
        Self {
            gauge_threshold: Self::DEFAULT_GAUGE_THRESHOLD,
            move_only_cost: Self::DEFAULT_MOVE_ONLY_COST,
            idle_cost: Self::DEFAULT_IDLE_COST,
            chain_hop_radius: Self::DEFAULT_CHAIN_HOP_RADIUS,
            chain_falloff: Self::DEFAULT_CHAIN_FALLOFF,
            tenacity_immunity: Self::DEFAULT_TENACITY_IMMUNITY,
            heal_threshold: Self::DEFAULT_HEAL_THRESHOLD,
            xp_per_victim_level: Self::DEFAULT_XP_PER_VICTIM_LEVEL,
            cleared_stage_xp_factor: Self::DEFAULT_CLEARED_STAGE_XP_FACTOR,
            mana_shield_fraction: Self::DEFAULT_MANA_SHIELD_FRACTION,
        }
    }

    pub fn with_gauge_threshold(mut self, threshold: f64) -> Self {
        self.gauge_threshold = threshold;
        self
    }

    /// Experience awarded for killing a unit of `victim_level`.
    pub fn kill_xp(&self, victim_level: u32, stage_cleared: bool) -> u32 {
        let base = victim_level * self.xp_per_victim_level;
        if stage_cleared {
            (base as f64 * self.cleared_stage_xp_factor).floor() as u32
        } else {
            base
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_xp_is_reduced_for_cleared_stages() {
        let config = BattleConfig::default();
        assert_eq!(config.kill_xp(3, false), 60);
        assert_eq!(config.kill_xp(3, true), 15);
    }
}
