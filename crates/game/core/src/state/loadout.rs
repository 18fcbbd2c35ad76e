//! Equipment and passive traits carried by units.

use crate::stats::StatKind;

/// Equipment slot. A piece only contributes to stats its slot governs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EquipSlot {
    Weapon,
    Armor,
    Accessory,
}

impl EquipSlot {
    pub const fn governs(self, stat: StatKind) -> bool {
        match self {
            EquipSlot::Weapon => matches!(
                stat,
                StatKind::AtkPhys | StatKind::AtkMag | StatKind::Hit | StatKind::Crit
            ),
            EquipSlot::Armor => matches!(
                stat,
                StatKind::Def | StatKind::Res | StatKind::HpMax | StatKind::Eva
            ),
            EquipSlot::Accessory => true,
        }
    }
}

/// A flat stat bonus from one equipped item.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquipmentItem {
    pub name: String,
    pub slot: EquipSlot,
    pub stat: StatKind,
    pub amount: f64,
}

impl EquipmentItem {
    pub fn new(name: impl Into<String>, slot: EquipSlot, stat: StatKind, amount: f64) -> Self {
        Self {
            name: name.into(),
            slot,
            stat,
            amount,
        }
    }

    /// Contribution to `stat`, zero when the slot does not govern it.
    pub fn bonus_for(&self, stat: StatKind) -> f64 {
        if self.stat == stat && self.slot.governs(stat) {
            self.amount
        } else {
            0.0
        }
    }
}

/// A passive trait, active once the owner reaches `tier`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Passive {
    pub key: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tier: u32,
    pub kind: PassiveKind,
}

impl Passive {
    pub fn new(key: impl Into<String>, tier: u32, kind: PassiveKind) -> Self {
        Self {
            key: key.into(),
            tier,
            kind,
        }
    }

    pub fn is_active(&self, level: u32) -> bool {
        level >= self.tier
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PassiveKind {
    /// Flat bonus to one derived stat.
    StatBonus { stat: StatKind, amount: f64 },
    /// Added to the critical multiplier.
    CritDamage { bonus: f64 },
    /// Fraction of incoming damage blocked.
    Block { ratio: f64 },
    /// Fraction of the defender's defense ignored.
    Penetration { ratio: f64 },
    /// Once per battle, survive a lethal blow with `hp_ratio` of max HP.
    ReviveOnDeath { hp_ratio: f64 },
}
