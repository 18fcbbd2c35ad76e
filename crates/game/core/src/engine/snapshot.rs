//! Read-only views of a battle for hosts and renderers.

use crate::hex::{Direction, Hex};
use crate::state::{BattleOutcome, BattleState, Team, Trap, TurnFlags, Unit, UnitId};
use crate::status::BuffKind;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffView {
    pub kind: BuffKind,
    pub duration: u32,
    pub magnitude: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitView {
    pub id: UnitId,
    pub name: String,
    pub team: Team,
    pub position: Hex,
    pub facing: Direction,
    pub level: u32,
    pub hp: i32,
    pub hp_max: i32,
    pub mp: i32,
    pub mp_max: i32,
    pub gauge: f64,
    pub alive: bool,
    pub buffs: Vec<BuffView>,
}

impl UnitView {
    pub fn of(unit: &Unit) -> Self {
        let stats = unit.stats();
        Self {
            id: unit.id,
            name: unit.name.clone(),
            team: unit.team,
            position: unit.position,
            facing: unit.facing,
            level: unit.level,
            hp: unit.hp,
            hp_max: stats.hp_max,
            mp: unit.mp,
            mp_max: stats.mp_max,
            gauge: unit.gauge,
            alive: unit.is_alive(),
            buffs: unit
                .buffs
                .iter()
                .map(|buff| BuffView {
                    kind: buff.kind,
                    duration: buff.duration,
                    magnitude: buff.magnitude,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSnapshot {
    pub units: Vec<UnitView>,
    pub traps: Vec<Trap>,
    pub current_actor: Option<UnitId>,
    pub flags: TurnFlags,
    pub selected: Option<String>,
    pub auto_play: bool,
    pub loot_gold: u32,
    pub outcome: Option<BattleOutcome>,
}

impl BattleSnapshot {
    pub fn capture(state: &BattleState, auto_play: bool) -> Self {
        let turn = state.turn.as_ref();
        Self {
            units: state.units.iter().map(UnitView::of).collect(),
            traps: state.traps.clone(),
            current_actor: turn.map(|t| t.actor),
            flags: turn.map(|t| t.flags).unwrap_or_default(),
            selected: turn.and_then(|t| t.selected.clone()),
            auto_play,
            loot_gold: state.loot_gold,
            outcome: state.outcome,
        }
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitView> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn living_on(&self, team: Team) -> usize {
        self.units.iter().filter(|u| u.alive && u.team == team).count()
    }
}
