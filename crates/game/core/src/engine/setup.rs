//! Battle seeding: spawn notation, unit construction, deployment.

use std::str::FromStr;

use crate::env::{CatalogOracle, HexMap, MapOracle, UnitTemplate};
use crate::hex::Hex;
use crate::state::{PlayerRoster, RosterId, Team, Unit, UnitId};
use crate::status::BuffList;

/// One entry of an enemy spawn list.
///
/// ```text
/// goblin        one goblin, auto-placed
/// goblin*3      three goblins, auto-placed
/// goblin:2:-1   one goblin at (2, -1)
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnSpec {
    pub key: String,
    pub count: u32,
    pub position: Option<Hex>,
}

impl SpawnSpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            count: 1,
            position: None,
        }
    }

    pub fn times(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn at(mut self, position: Hex) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpawnParseError {
    #[error("empty spawn entry")]
    Empty,

    #[error("invalid spawn count in `{0}`")]
    BadCount(String),

    #[error("invalid coordinates in `{0}`; expected key:q:r")]
    BadPosition(String),
}

impl FromStr for SpawnSpec {
    type Err = SpawnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entry = s.trim();
        if entry.is_empty() {
            return Err(SpawnParseError::Empty);
        }

        if let Some((key, count)) = entry.split_once('*') {
            let count: u32 = count
                .trim()
                .parse()
                .map_err(|_| SpawnParseError::BadCount(entry.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(SpawnParseError::Empty);
            }
            if count == 0 {
                return Err(SpawnParseError::BadCount(entry.to_string()));
            }
            return Ok(SpawnSpec::new(key).times(count));
        }

        let mut parts = entry.split(':');
        let key = parts.next().unwrap_or_default().trim();
        if key.is_empty() {
            return Err(SpawnParseError::Empty);
        }
        let coords: Vec<&str> = parts.collect();
        match coords.as_slice() {
            [] => Ok(SpawnSpec::new(key)),
            [q, r] => {
                let bad = || SpawnParseError::BadPosition(entry.to_string());
                let q = q.trim().parse().map_err(|_| bad())?;
                let r = r.trim().parse().map_err(|_| bad())?;
                Ok(SpawnSpec::new(key).at(Hex::new(q, r)))
            }
            _ => Err(SpawnParseError::BadPosition(entry.to_string())),
        }
    }
}

/// Parses a comma-separated spawn list such as `goblin*2, archer:3:0`.
pub fn parse_spawn_list(list: &str) -> Result<Vec<SpawnSpec>, SpawnParseError> {
    list.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Everything needed to open a battle besides catalog and map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSetup {
    pub party: Vec<RosterId>,
    pub enemies: Vec<SpawnSpec>,
    pub seed: u64,
    /// Kill experience is reduced on stages that were cleared before.
    pub stage_cleared: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("the party is empty")]
    EmptyParty,

    #[error("no enemies to fight")]
    NoEnemies,

    #[error("roster has no member {0:?}")]
    UnknownMember(RosterId),

    #[error("roster member {0:?} is listed twice in the party")]
    DuplicateMember(RosterId),

    #[error("unknown unit template `{0}`")]
    UnknownTemplate(String),

    #[error("unit `{unit}` references unknown skill `{skill}`")]
    UnknownSkill { unit: String, skill: String },

    #[error("unit `{unit}` references unknown passive `{passive}`")]
    UnknownPassive { unit: String, passive: String },

    #[error("spawn hex {0} is off the map or impassable")]
    BadSpawnHex(Hex),

    #[error("spawn hex {0} is already taken")]
    SpawnOccupied(Hex),

    #[error("no room left to deploy `{0}`")]
    NoRoom(String),
}

/// Builds a fresh unit from `template`, resolving skills and passives.
pub fn unit_from_template(
    id: UnitId,
    template: &UnitTemplate,
    team: Team,
    catalog: &dyn CatalogOracle,
) -> Result<Unit, SetupError> {
    let mut unit = Unit::new(id, template.name.clone(), team, template.attributes)
        .with_level(template.level.max(1))
        .with_movement(template.movement)
        .with_attack_range(template.attack_range)
        .with_element(template.element)
        .with_gold(template.gold);
    unit.template = template.key.clone();
    unit.base_hp = template.base_hp;
    unit.base_mp = template.base_mp;

    for skill_id in &template.skills {
        let skill = catalog
            .skill(skill_id)
            .ok_or_else(|| SetupError::UnknownSkill {
                unit: template.key.clone(),
                skill: skill_id.clone(),
            })?;
        unit.skills.push(skill.clone());
    }
    for key in &template.passives {
        let passive = catalog
            .passive(key)
            .ok_or_else(|| SetupError::UnknownPassive {
                unit: template.key.clone(),
                passive: key.clone(),
            })?;
        unit.passives.push(passive.clone());
    }
    unit.equipment = template.equipment.clone();
    unit.restore_full();
    Ok(unit)
}

/// Battle copy of a roster member: fresh transient state, persistent pools.
fn enlist(member: &Unit, id: UnitId) -> Unit {
    let mut unit = member.clone();
    unit.id = id;
    unit.team = Team::Player;
    unit.gauge = 0.0;
    unit.buffs = BuffList::new();
    unit.cooldowns.clear();
    unit.revive_used = false;
    unit.clamp_pools();
    if !unit.is_alive() {
        unit.hp = 1;
    }
    unit
}

/// Free passable hexes around `anchor`, nearest first.
struct Deployment<'a> {
    map: &'a HexMap,
    anchor: Hex,
}

impl Deployment<'_> {
    fn next_free(&self, taken: &[Unit]) -> Option<Hex> {
        let mut candidates: Vec<Hex> = self
            .map
            .tiles()
            .map(|(hex, _)| hex)
            .filter(|hex| self.map.is_passable(*hex))
            .filter(|hex| taken.iter().all(|u| u.position != *hex))
            .collect();
        candidates.sort_by_key(|hex| (hex.distance(self.anchor), *hex));
        candidates.first().copied()
    }
}

/// Builds the battle roster: party first, then enemies. Fixed-position
/// spawns are placed before auto-placed ones.
pub fn deploy(
    setup: &BattleSetup,
    roster: &PlayerRoster,
    catalog: &dyn CatalogOracle,
    map: &HexMap,
) -> Result<Vec<Unit>, SetupError> {
    if setup.party.is_empty() {
        return Err(SetupError::EmptyParty);
    }
    if setup.enemies.iter().all(|spec| spec.count == 0) {
        return Err(SetupError::NoEnemies);
    }

    let mut units: Vec<Unit> = Vec::new();
    let next_id = |units: &Vec<Unit>| UnitId(units.len() as u32);

    let home = Deployment {
        map,
        anchor: map.player_anchor(),
    };
    let home_facing = map.deployment_facing(map.player_anchor());
    for (index, roster_id) in setup.party.iter().enumerate() {
        if setup.party[..index].contains(roster_id) {
            return Err(SetupError::DuplicateMember(*roster_id));
        }
        let member = roster
            .get(*roster_id)
            .ok_or(SetupError::UnknownMember(*roster_id))?;
        let at = home
            .next_free(&units)
            .ok_or_else(|| SetupError::NoRoom(member.name.clone()))?;
        let mut unit = enlist(member, next_id(&units)).at(at);
        unit.facing = home_facing;
        units.push(unit);
    }

    let away = Deployment {
        map,
        anchor: map.enemy_anchor(),
    };
    let away_facing = map.deployment_facing(map.enemy_anchor());
    let (fixed, floating): (Vec<&SpawnSpec>, Vec<&SpawnSpec>) =
        setup.enemies.iter().partition(|spec| spec.position.is_some());

    for spec in fixed {
        let template = catalog
            .unit(&spec.key)
            .ok_or_else(|| SetupError::UnknownTemplate(spec.key.clone()))?;
        let Some(at) = spec.position else {
            continue;
        };
        if !map.is_passable(at) {
            return Err(SetupError::BadSpawnHex(at));
        }
        if units.iter().any(|u| u.position == at) {
            return Err(SetupError::SpawnOccupied(at));
        }
        let mut unit = unit_from_template(next_id(&units), template, Team::Enemy, catalog)?.at(at);
        unit.facing = away_facing;
        units.push(unit);
    }

    for spec in floating {
        let template = catalog
            .unit(&spec.key)
            .ok_or_else(|| SetupError::UnknownTemplate(spec.key.clone()))?;
        for _ in 0..spec.count {
            let at = away
                .next_free(&units)
                .ok_or_else(|| SetupError::NoRoom(spec.key.clone()))?;
            let mut unit =
                unit_from_template(next_id(&units), template, Team::Enemy, catalog)?.at(at);
            unit.facing = away_facing;
            units.push(unit);
        }
    }

    tracing::debug!(units = units.len(), "battle deployed");
    Ok(units)
}
