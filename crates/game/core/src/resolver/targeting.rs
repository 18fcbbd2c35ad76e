//! Pure target collection.

use crate::hex::{Hex, line_cells};
use crate::skill::{Effect, TargetMode};
use crate::state::{BattleState, Unit, UnitId};

/// Whether `candidate` may be picked by `caster` as an opponent.
fn is_valid_opponent(caster: &Unit, candidate: &Unit) -> bool {
    candidate.team != caster.team && !candidate.buffs.is_hidden()
}

/// Units affected by `effect` when `caster` aims at `target`.
///
/// Only living units are returned. Hostile effects collect opponents and
/// skip hidden ones; supportive effects collect allies. A confused caster's
/// single-target effects accept any unit on the clicked hex.
pub fn collect_targets(
    state: &BattleState,
    caster: &Unit,
    effect: &Effect,
    target: Hex,
) -> Vec<UnitId> {
    let hostile = effect.is_hostile();
    let confused = caster.has(crate::status::BuffKind::Confuse);
    let wanted = |unit: &Unit| {
        if hostile {
            is_valid_opponent(caster, unit)
        } else {
            unit.team == caster.team
        }
    };

    match effect.target {
        TargetMode::SelfOnly => vec![caster.id],
        TargetMode::SingleEnemy => state
            .occupant(target)
            .filter(|unit| {
                unit.id != caster.id && (confused || is_valid_opponent(caster, unit))
            })
            .map(|unit| vec![unit.id])
            .unwrap_or_default(),
        TargetMode::SingleAlly => state
            .occupant(target)
            .filter(|unit| confused || unit.team == caster.team)
            .map(|unit| vec![unit.id])
            .unwrap_or_default(),
        TargetMode::Area => state
            .living()
            .filter(|unit| unit.position.distance(target) <= effect.area)
            .filter(|unit| wanted(unit))
            .map(|unit| unit.id)
            .collect(),
        TargetMode::AllAllies => state
            .living_on(caster.team)
            .map(|unit| unit.id)
            .collect(),
        TargetMode::AllEnemies => state
            .living()
            .filter(|unit| is_valid_opponent(caster, unit))
            .map(|unit| unit.id)
            .collect(),
        TargetMode::Line => line_cells(caster.position, target)
            .into_iter()
            .filter_map(|hex| state.occupant(hex))
            .filter(|unit| wanted(unit))
            .map(|unit| unit.id)
            .collect(),
    }
}

/// Opponents around `target` regardless of concealment, for effects that
/// uncover hidden units.
pub fn hidden_opponents(state: &BattleState, caster: &Unit, target: Hex, radius: u32) -> Vec<UnitId> {
    state
        .living()
        .filter(|unit| unit.team != caster.team)
        .filter(|unit| unit.position.distance(target) <= radius)
        .filter(|unit| unit.buffs.is_hidden())
        .map(|unit| unit.id)
        .collect()
}
