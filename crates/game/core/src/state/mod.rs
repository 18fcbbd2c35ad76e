//! Battle state: units, traps, turn bookkeeping and the persistent roster.
mod battle;
mod loadout;
mod roster;
mod unit;

pub use battle::{BattleOutcome, BattleState, Trap, TrapKind, TurnFlags, TurnState};
pub use loadout::{EquipSlot, EquipmentItem, Passive, PassiveKind};
pub use roster::{BattleReport, MemberProgress, PlayerRoster};
pub use unit::{RosterId, Team, Unit, UnitId};
