//! Persistent player roster and post-battle write-back.

use std::collections::BTreeMap;

use super::battle::BattleOutcome;
use super::unit::{RosterId, Team, Unit, UnitId};

/// Long-lived player units, keyed by [`RosterId`].
///
/// Battles clone members into the session; [`PlayerRoster::commit`] is the
/// only path that writes results back.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerRoster {
    members: BTreeMap<RosterId, Unit>,
    gold: u32,
}

impl PlayerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member and returns its id.
    pub fn recruit(&mut self, mut unit: Unit) -> RosterId {
        let id = RosterId(self.members.keys().map(|id| id.0 + 1).max().unwrap_or(0));
        unit.team = Team::Player;
        unit.roster_id = Some(id);
        self.members.insert(id, unit);
        id
    }

    pub fn get(&self, id: RosterId) -> Option<&Unit> {
        self.members.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = RosterId> + '_ {
        self.members.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }

    /// Writes battle results back. Members who died return at 1 HP.
    pub fn commit(&mut self, report: &BattleReport) {
        for progress in &report.members {
            let Some(member) = self.members.get_mut(&progress.roster_id) else {
                continue;
            };
            member.hp = progress.hp.max(1);
            member.mp = progress.mp;
            member.xp = progress.xp;
            member.level = progress.level;
            member.stat_points = progress.stat_points;
            member.clamp_pools();
        }
        self.gold += report.loot_gold;
    }
}

/// End-of-battle state of one roster member.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberProgress {
    pub roster_id: RosterId,
    pub unit: UnitId,
    pub hp: i32,
    pub mp: i32,
    pub xp: u32,
    pub level: u32,
    pub stat_points: u32,
}

impl MemberProgress {
    pub fn of(unit: &Unit) -> Option<Self> {
        Some(Self {
            roster_id: unit.roster_id?,
            unit: unit.id,
            hp: unit.hp,
            mp: unit.mp,
            xp: unit.xp,
            level: unit.level,
            stat_points: unit.stat_points,
        })
    }
}

/// Summary handed to the host when a battle ends.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub members: Vec<MemberProgress>,
    pub loot_gold: u32,
}
