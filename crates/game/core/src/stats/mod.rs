//! Stat model: attributes in, derived combat stats out.
//!
//! Everything here is a pure function of a unit's attributes, equipment,
//! passives and active buffs, so stats are recomputed on demand instead of
//! being cached on the unit.
mod attributes;
mod bonus;
mod derived;

pub use attributes::{Attributes, StatKind};
pub use bonus::{Bonus, BonusSet, BonusStack};
pub use derived::{CombatStats, StatInputs};
