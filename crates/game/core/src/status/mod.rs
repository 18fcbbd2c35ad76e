//! Buffs and debuffs attached to units.
//!
//! A unit holds at most one live [`Buff`] per [`BuffKind`]; reapplying a kind
//! overwrites the existing entry in place. Durations count the owner's turns
//! and tick down at turn start, after the per-turn effect fires.
mod resist;

pub use resist::{StatusRoll, application_chance, roll_application, status_power};

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::state::UnitId;
use crate::stats::{Bonus, StatKind};

/// Closed catalog of status kinds.
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
    strum::EnumString,
    strum::AsRefStr,
    strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuffKind {
    // ========================================================================
    // Crowd control
    // ========================================================================
    Stun,
    Freeze,
    Sleep,
    Fear,
    Charm,

    // ========================================================================
    // Control
    // ========================================================================
    Confuse,
    Silence,
    Root,
    Taunt,

    // ========================================================================
    // Damage over time
    // ========================================================================
    Poison,
    Burn,
    Bleed,

    // ========================================================================
    // Stat debuffs
    // ========================================================================
    AttackDown,
    DefenseDown,
    Slow,
    Blind,
    ArmorBreak,
    Curse,
    Vulnerable,
    /// Freezes the action gauge.
    Stop,

    // ========================================================================
    // Buffs
    // ========================================================================
    AttackUp,
    DefenseUp,
    Haste,
    Focus,
    Precision,
    Evasion,
    CritDamageUp,
    Regen,
    Shield,
    ManaShield,
    Block,
    Invulnerable,
    Stealth,
    Untargetable,
}

impl BuffKind {
    /// Negative kinds roll against resistance and are removed by cleanse.
    pub const fn is_debuff(self) -> bool {
        (self as u8) <= (BuffKind::Stop as u8)
    }

    /// Kinds that prevent casting anything.
    pub const fn is_crowd_control(self) -> bool {
        matches!(
            self,
            BuffKind::Stun | BuffKind::Freeze | BuffKind::Sleep | BuffKind::Fear | BuffKind::Charm
        )
    }

    /// Kinds that forfeit the turn outright. Fear is excluded: a feared unit
    /// still flees on its turn.
    pub const fn skips_turn(self) -> bool {
        self.is_crowd_control() && !matches!(self, BuffKind::Fear)
    }

    /// Kinds that hide the owner from enemy target selection.
    pub const fn hides_from_enemies(self) -> bool {
        matches!(self, BuffKind::Stealth | BuffKind::Untargetable)
    }

    /// Stat bonuses granted while the buff is active.
    pub fn stat_bonuses(self, magnitude: f64) -> ArrayVec<(StatKind, Bonus), 2> {
        let mut out = ArrayVec::new();
        match self {
            BuffKind::AttackUp => {
                out.push((StatKind::AtkPhys, Bonus::Scale(1.0 + magnitude)));
                out.push((StatKind::AtkMag, Bonus::Scale(1.0 + magnitude)));
            }
            BuffKind::AttackDown => {
                out.push((StatKind::AtkPhys, Bonus::Scale((1.0 - magnitude).max(0.0))));
                out.push((StatKind::AtkMag, Bonus::Scale((1.0 - magnitude).max(0.0))));
            }
            BuffKind::DefenseUp => {
                out.push((StatKind::Def, Bonus::Flat(magnitude)));
                out.push((StatKind::Res, Bonus::Flat(magnitude)));
            }
            BuffKind::DefenseDown => {
                out.push((StatKind::Def, Bonus::Scale((1.0 - magnitude).max(0.0))));
                out.push((StatKind::Res, Bonus::Scale((1.0 - magnitude).max(0.0))));
            }
            BuffKind::Haste => out.push((StatKind::Spd, Bonus::Flat(magnitude))),
            BuffKind::Slow => out.push((StatKind::Spd, Bonus::Scale((1.0 - magnitude).max(0.0)))),
            BuffKind::Focus => out.push((StatKind::Crit, Bonus::Flat(magnitude))),
            BuffKind::Precision => out.push((StatKind::Hit, Bonus::Flat(magnitude))),
            BuffKind::Blind => out.push((StatKind::Hit, Bonus::Flat(-magnitude))),
            BuffKind::Evasion => out.push((StatKind::Eva, Bonus::Flat(magnitude))),
            _ => {}
        }
        out
    }
}

/// A live status entry.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Buff {
    pub kind: BuffKind,
    /// Owner turns remaining.
    pub duration: u32,
    pub magnitude: f64,
    /// Id lookup only; the caster may already be dead.
    pub caster: Option<UnitId>,
    /// Remaining pool for absorbing kinds.
    pub amount: Option<f64>,
}

impl Buff {
    pub fn new(kind: BuffKind, duration: u32, magnitude: f64) -> Self {
        Self {
            kind,
            duration,
            magnitude,
            caster: None,
            amount: None,
        }
    }

    pub fn with_caster(mut self, caster: UnitId) -> Self {
        self.caster = Some(caster);
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// Outcome of [`BuffList::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuffApplication {
    Added,
    Refreshed,
}

/// Per-buff result of a turn-start tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuffTick {
    pub kind: BuffKind,
    pub damage: i32,
    pub heal: i32,
    pub expired: bool,
}

/// Buffs carried by one unit, at most one per kind, in application order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffList {
    buffs: ArrayVec<Buff, { BattleConfig::MAX_BUFFS }>,
}

impl BuffList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `buff`, or overwrites duration, magnitude, caster and amount of
    /// the live entry of the same kind.
    pub fn apply(&mut self, buff: Buff) -> BuffApplication {
        if let Some(existing) = self.buffs.iter_mut().find(|b| b.kind == buff.kind) {
            *existing = buff;
            return BuffApplication::Refreshed;
        }
        // One slot per kind, so the list cannot overflow.
        self.buffs.push(buff);
        BuffApplication::Added
    }

    pub fn get(&self, kind: BuffKind) -> Option<&Buff> {
        self.buffs.iter().find(|b| b.kind == kind)
    }

    pub fn has(&self, kind: BuffKind) -> bool {
        self.get(kind).is_some()
    }

    /// Magnitude of `kind`, or 0 when absent.
    pub fn magnitude(&self, kind: BuffKind) -> f64 {
        self.get(kind).map_or(0.0, |b| b.magnitude)
    }

    pub fn remove(&mut self, kind: BuffKind) -> Option<Buff> {
        let index = self.buffs.iter().position(|b| b.kind == kind)?;
        Some(self.buffs.remove(index))
    }

    /// Removes every debuff and returns the removed kinds.
    pub fn cleanse(&mut self) -> Vec<BuffKind> {
        let removed: Vec<BuffKind> = self
            .buffs
            .iter()
            .filter(|b| b.kind.is_debuff())
            .map(|b| b.kind)
            .collect();
        self.buffs.retain(|b| !b.kind.is_debuff());
        removed
    }

    pub fn clear(&mut self) {
        self.buffs.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buff> {
        self.buffs.iter()
    }

    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }

    /// First active kind that forfeits the owner's turn.
    pub fn turn_skip_cause(&self) -> Option<BuffKind> {
        self.buffs
            .iter()
            .map(|b| b.kind)
            .find(|kind| kind.skips_turn())
    }

    pub fn is_crowd_controlled(&self) -> bool {
        self.buffs.iter().any(|b| b.kind.is_crowd_control())
    }

    pub fn is_hidden(&self) -> bool {
        self.buffs.iter().any(|b| b.kind.hides_from_enemies())
    }

    /// Routes `damage` through a shield pool first.
    ///
    /// Returns `(remaining_damage, absorbed)`; the shield is removed once its
    /// pool is exhausted.
    pub fn absorb(&mut self, damage: i32) -> (i32, i32) {
        let Some(shield) = self.buffs.iter_mut().find(|b| b.kind == BuffKind::Shield) else {
            return (damage, 0);
        };
        let pool = shield.amount.unwrap_or(shield.magnitude).max(0.0).floor() as i32;
        let absorbed = pool.min(damage.max(0));
        let left = pool - absorbed;
        shield.amount = Some(left as f64);
        if left == 0 {
            self.remove(BuffKind::Shield);
        }
        (damage - absorbed, absorbed)
    }

    /// Fires per-turn effects, then decrements durations and drops expired
    /// entries. Stop is excluded: it advances through [`Self::advance_stop`].
    pub fn tick(&mut self) -> Vec<BuffTick> {
        let mut ticks = Vec::new();
        for buff in self.buffs.iter_mut() {
            if buff.kind == BuffKind::Stop {
                continue;
            }
            let amount = buff.magnitude.max(1.0).floor() as i32;
            let (damage, heal) = match buff.kind {
                BuffKind::Poison | BuffKind::Burn | BuffKind::Bleed => (amount, 0),
                BuffKind::Regen => (0, amount),
                _ => (0, 0),
            };
            buff.duration = buff.duration.saturating_sub(1);
            ticks.push(BuffTick {
                kind: buff.kind,
                damage,
                heal,
                expired: buff.duration == 0,
            });
        }
        self.buffs
            .retain(|b| b.kind == BuffKind::Stop || b.duration > 0);
        ticks
    }

    /// Counts down Stop by one; returns true when it expired.
    pub fn advance_stop(&mut self) -> bool {
        let Some(stop) = self.buffs.iter_mut().find(|b| b.kind == BuffKind::Stop) else {
            return false;
        };
        stop.duration = stop.duration.saturating_sub(1);
        if stop.duration == 0 {
            self.remove(BuffKind::Stop);
            return true;
        }
        false
    }
}
