//! Base attributes and the derived stat identifiers they feed.

/// The seven base attributes every unit carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Attributes {
    /// Strength: physical attack, some defense and HP.
    pub str: i32,
    /// Intelligence: magic attack, resistance, MP.
    pub int: i32,
    /// Vitality: defense, resistance, HP, tenacity.
    pub vit: i32,
    /// Agility: evasion and speed.
    pub agi: i32,
    /// Dexterity: accuracy, crit, half of both attacks.
    pub dex: i32,
    /// Volatility: widens the upper damage variance.
    pub vol: i32,
    /// Luck: crit, evasion, tenacity.
    pub luk: i32,
}

impl Attributes {
    pub const fn new(str: i32, int: i32, vit: i32, agi: i32, dex: i32, vol: i32, luk: i32) -> Self {
        Self {
            str,
            int,
            vit,
            agi,
            dex,
            vol,
            luk,
        }
    }

    /// Every attribute set to `value`.
    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value, value, value, value)
    }
}

/// Identifier for each derived combat stat.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    strum::EnumCount,
    strum::AsRefStr,
    strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatKind {
    AtkPhys,
    AtkMag,
    Def,
    Res,
    Hit,
    Crit,
    Eva,
    Tenacity,
    HpMax,
    MpMax,
    Spd,
}

impl StatKind {
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stats clamped at zero instead of floored to integers.
    pub const fn is_rate(self) -> bool {
        matches!(
            self,
            StatKind::Hit | StatKind::Crit | StatKind::Eva | StatKind::Tenacity
        )
    }

    /// Attribute contribution before any bonus layer.
    pub fn base_value(self, attrs: &Attributes, base_hp: i32, base_mp: i32) -> f64 {
        let a = |v: i32| v as f64;
        match self {
            StatKind::AtkPhys => a(attrs.str) + a(attrs.dex) * 0.5,
            StatKind::AtkMag => a(attrs.int) + a(attrs.dex) * 0.5,
            StatKind::Def => a(attrs.vit) * 0.5 + a(attrs.str) * 0.2,
            StatKind::Res => a(attrs.int) * 0.5 + a(attrs.vit) * 0.2,
            StatKind::Hit => 90.0 + a(attrs.dex) * 1.5 + a(attrs.luk) * 0.2,
            StatKind::Crit => a(attrs.luk) + a(attrs.dex) * 0.5,
            StatKind::Eva => a(attrs.agi) * 1.5 + a(attrs.luk) * 0.5,
            StatKind::Tenacity => a(attrs.vit) + a(attrs.luk) * 0.5,
            StatKind::HpMax => 50.0 + a(base_hp) + a(attrs.vit) * 10.0 + a(attrs.str) * 2.0,
            StatKind::MpMax => a(base_mp) + a(attrs.int) * 5.0,
            StatKind::Spd => 70.0 + a(attrs.agi) + a(attrs.int) * 0.5,
        }
    }
}
