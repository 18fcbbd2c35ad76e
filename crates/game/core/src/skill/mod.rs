//! Skills and their tagged effects.
//!
//! A skill is pure data: costs, range, and one main [`Effect`] plus an
//! optional sub effect resolved one scheduling step later. Effect behavior is
//! selected by the closed [`EffectKind`] union; data files that name an
//! unknown kind deserialize to [`EffectKind::Unknown`] and resolve as a no-op.

use crate::combat::{DamageCategory, Element};
use crate::state::TrapKind;
use crate::status::BuffKind;

/// Which units an effect collects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetMode {
    SelfOnly,
    #[default]
    SingleEnemy,
    SingleAlly,
    /// Every unit within `area` of the target hex.
    Area,
    AllAllies,
    AllEnemies,
    /// Every unit on the traced line from the caster toward the target hex.
    Line,
}

impl TargetMode {
    /// Modes that ignore the clicked hex entirely.
    pub const fn is_global(self) -> bool {
        matches!(
            self,
            TargetMode::SelfOnly | TargetMode::AllAllies | TargetMode::AllEnemies
        )
    }
}

/// Closed set of effect behaviors.
///
/// Serialized externally tagged, which reads naturally in RON:
/// `kind: AreaDamage`, `kind: ChainDamage(bounces: 2)`,
/// `kind: Status(buff: Burn)`. An unrecognized unit tag lands on
/// [`EffectKind::Unknown`].
#[derive(Clone, Copy, Debug, Default, PartialEq, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    // ========================================================================
    // Damage
    // ========================================================================
    #[default]
    Damage,
    MultiHit {
        hits: u32,
    },
    AreaDamage,
    LineDamage,
    ChainDamage {
        bounces: u32,
    },
    /// Kills outright below `threshold` HP ratio, otherwise normal damage.
    Execute {
        threshold: f64,
    },
    /// Uses the caster's defense as the attack stat.
    DefenseScaledDamage,
    /// Magnitude grows with caster-target distance.
    DistanceScaledDamage,

    // ========================================================================
    // Healing
    // ========================================================================
    Heal,
    HealPercent,
    HealFull,
    AreaHeal,

    // ========================================================================
    // Positioning
    // ========================================================================
    Knockback,
    Pull,
    Teleport,
    Swap,
    MoveBehind,

    // ========================================================================
    // Resources
    // ========================================================================
    DrainMp,
    RestoreMp,
    GaugeFill,
    GaugeDrain,
    GaugeSet,
    GaugeMax,

    // ========================================================================
    // Utility
    // ========================================================================
    Steal,
    RevealStealth,
    ResetCooldown,
    PlaceTrap {
        trap: TrapKind,
    },
    Cleanse,

    /// Generic status application.
    Status {
        buff: BuffKind,
    },

    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl EffectKind {
    pub const fn is_damage(self) -> bool {
        matches!(
            self,
            EffectKind::Damage
                | EffectKind::MultiHit { .. }
                | EffectKind::AreaDamage
                | EffectKind::LineDamage
                | EffectKind::ChainDamage { .. }
                | EffectKind::Execute { .. }
                | EffectKind::DefenseScaledDamage
                | EffectKind::DistanceScaledDamage
        )
    }

    pub const fn is_heal(self) -> bool {
        matches!(
            self,
            EffectKind::Heal | EffectKind::HealPercent | EffectKind::HealFull | EffectKind::AreaHeal
        )
    }
}

/// One data-described effect.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Effect {
    pub kind: EffectKind,
    pub target: TargetMode,
    pub magnitude: f64,
    /// Radius for area modes, extra distance for knockback.
    pub area: u32,
    /// Turns, for status kinds.
    pub duration: u32,
    pub sure_hit: bool,
    /// Fraction of defense ignored.
    pub penetration: f64,
    /// Explicit status application chance in percent.
    pub chance: Option<f64>,
}

impl Effect {
    pub fn new(kind: EffectKind, target: TargetMode, magnitude: f64) -> Self {
        Self {
            kind,
            target,
            magnitude,
            ..Self::default()
        }
    }

    pub fn with_area(mut self, area: u32) -> Self {
        self.area = area;
        self
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_chance(mut self, chance: f64) -> Self {
        self.chance = Some(chance);
        self
    }

    pub fn sure_hit(mut self) -> Self {
        self.sure_hit = true;
        self
    }

    /// Effects that an AI should aim at opponents.
    pub fn is_hostile(&self) -> bool {
        match self.kind {
            EffectKind::Status { buff } => buff.is_debuff(),
            EffectKind::Knockback
            | EffectKind::Pull
            | EffectKind::DrainMp
            | EffectKind::GaugeDrain
            | EffectKind::Steal
            | EffectKind::RevealStealth => true,
            kind => kind.is_damage(),
        }
    }
}

impl Default for Effect {
    fn default() -> Self {
        Self {
            kind: EffectKind::Damage,
            target: TargetMode::SingleEnemy,
            magnitude: 1.0,
            area: 0,
            duration: 0,
            sure_hit: false,
            penetration: 0.0,
            chance: None,
        }
    }
}

/// Skill template.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub mp_cost: u32,
    pub gauge_cost: f64,
    pub range: u32,
    pub cooldown: u32,
    /// Minimum unit level.
    pub tier: u32,
    pub category: DamageCategory,
    pub element: Element,
    /// Enables dashing toward distant targets.
    pub melee: bool,
    pub main: Effect,
    pub sub: Option<Effect>,
}

impl Skill {
    pub const BASIC_ATTACK: &'static str = "basic_attack";

    pub fn new(id: impl Into<String>, main: Effect) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            main,
            ..Self::default()
        }
    }

    /// The implicit attack every unit has.
    pub fn basic_attack(range: u32, element: Element) -> Self {
        Self {
            id: Self::BASIC_ATTACK.to_string(),
            name: "Attack".to_string(),
            mp_cost: 0,
            gauge_cost: 100.0,
            range: range.max(1),
            cooldown: 0,
            tier: 0,
            category: DamageCategory::Physical,
            element,
            melee: range <= 1,
            main: Effect::new(EffectKind::Damage, TargetMode::SingleEnemy, 1.0),
            sub: None,
        }
    }

    pub fn is_basic_attack(&self) -> bool {
        self.id == Self::BASIC_ATTACK
    }

    pub fn with_costs(mut self, mp_cost: u32, gauge_cost: f64) -> Self {
        self.mp_cost = mp_cost;
        self.gauge_cost = gauge_cost;
        self
    }

    pub fn with_range(mut self, range: u32) -> Self {
        self.range = range;
        self
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_tier(mut self, tier: u32) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_category(mut self, category: DamageCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn melee(mut self) -> Self {
        self.melee = true;
        self
    }

    pub fn with_sub(mut self, sub: Effect) -> Self {
        self.sub = Some(sub);
        self
    }

    /// Skills whose main effect helps its targets.
    pub fn is_supportive(&self) -> bool {
        !self.main.is_hostile()
    }
}

impl Default for Skill {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            mp_cost: 0,
            gauge_cost: 100.0,
            range: 1,
            cooldown: 0,
            tier: 0,
            category: DamageCategory::Physical,
            element: Element::Neutral,
            melee: false,
            main: Effect::default(),
            sub: None,
        }
    }
}
