use bitflags::bitflags;

use super::unit::{Team, Unit, UnitId};
use crate::hex::Hex;

bitflags! {
    /// What the current actor has already done this turn.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TurnFlags: u8 {
        const MOVED = 1 << 0;
        const ACTED = 1 << 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrapKind {
    /// Flat damage equal to the trap's power.
    Spike,
    /// Roots the victim and halts its move on the trap hex.
    Snare,
}

/// A hidden trap waiting for an opposing unit to walk over it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trap {
    pub position: Hex,
    pub kind: TrapKind,
    pub owner: UnitId,
    pub team: Team,
    pub power: i32,
}

/// The actor whose turn is in progress.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    pub actor: UnitId,
    pub flags: TurnFlags,
    /// Gauge cost recorded by the committed action, if any.
    pub action_cost: Option<f64>,
    /// Selected but uncommitted skill.
    pub selected: Option<String>,
}

impl TurnState {
    pub fn new(actor: UnitId) -> Self {
        Self {
            actor,
            flags: TurnFlags::empty(),
            action_cost: None,
            selected: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.flags.contains(TurnFlags::MOVED | TurnFlags::ACTED)
    }
}

/// Battle result from the player's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

/// Mutable battle state owned by the session.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    /// All units in roster order, dead ones included.
    pub units: Vec<Unit>,
    pub traps: Vec<Trap>,
    pub turn: Option<TurnState>,
    pub loot_gold: u32,
    pub stage_cleared: bool,
    pub outcome: Option<BattleOutcome>,
}

impl BattleState {
    pub fn new(units: Vec<Unit>, stage_cleared: bool) -> Self {
        Self {
            units,
            stage_cleared,
            ..Self::default()
        }
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn living(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.is_alive())
    }

    pub fn living_on(&self, team: Team) -> impl Iterator<Item = &Unit> {
        self.living().filter(move |u| u.team == team)
    }

    /// Living unit standing on `hex`.
    pub fn occupant(&self, hex: Hex) -> Option<&Unit> {
        self.living().find(|u| u.position == hex)
    }

    /// True when no living unit other than `ignore` stands on `hex`.
    pub fn is_free(&self, hex: Hex, ignore: Option<UnitId>) -> bool {
        self.living()
            .all(|u| u.position != hex || Some(u.id) == ignore)
    }

    pub fn trap_at(&self, hex: Hex) -> Option<&Trap> {
        self.traps.iter().find(|t| t.position == hex)
    }

    pub fn take_trap(&mut self, hex: Hex) -> Option<Trap> {
        let index = self.traps.iter().position(|t| t.position == hex)?;
        Some(self.traps.remove(index))
    }

    pub fn current_actor(&self) -> Option<UnitId> {
        self.turn.as_ref().map(|t| t.actor)
    }

    /// Outcome implied by the living counts, if one side is wiped out.
    pub fn decided_outcome(&self) -> Option<BattleOutcome> {
        if self.living_on(Team::Enemy).next().is_none() {
            Some(BattleOutcome::Victory)
        } else if self.living_on(Team::Player).next().is_none() {
            Some(BattleOutcome::Defeat)
        } else {
            None
        }
    }

    pub fn next_unit_id(&self) -> UnitId {
        UnitId(self.units.iter().map(|u| u.id.0 + 1).max().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Attributes;

    fn unit(id: u32, team: Team, at: Hex) -> Unit {
        Unit::new(UnitId(id), format!("u{id}"), team, Attributes::uniform(10)).at(at)
    }

    #[test]
    fn dead_units_do_not_occupy() {
        let mut state = BattleState::new(
            vec![unit(0, Team::Player, Hex::ORIGIN), unit(1, Team::Enemy, Hex::new(1, 0))],
            false,
        );
        assert!(!state.is_free(Hex::new(1, 0), None));
        assert!(state.is_free(Hex::new(1, 0), Some(UnitId(1))));
        if let Some(enemy) = state.unit_mut(UnitId(1)) {
            enemy.hp = 0;
        }
        assert!(state.is_free(Hex::new(1, 0), None));
        assert!(state.occupant(Hex::new(1, 0)).is_none());
        assert_eq!(state.decided_outcome(), Some(BattleOutcome::Victory));
    }

    #[test]
    fn flags_complete_turn() {
        let mut turn = TurnState::new(UnitId(0));
        turn.flags.insert(TurnFlags::MOVED);
        assert!(!turn.is_complete());
        turn.flags.insert(TurnFlags::ACTED);
        assert!(turn.is_complete());
    }
}
