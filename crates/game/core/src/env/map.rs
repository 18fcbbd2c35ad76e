use std::collections::BTreeMap;

use crate::config::BattleConfig;
use crate::hex::{Direction, Hex};

/// Static battlefield oracle: which hexes exist and what entering them costs.
pub trait MapOracle: Send + Sync {
    fn terrain(&self, hex: Hex) -> Option<TerrainKind>;

    /// Cost of entering `hex`, `None` when it is off the map.
    fn move_cost(&self, hex: Hex) -> Option<u32>;

    fn contains(&self, hex: Hex) -> bool {
        self.terrain(hex).is_some()
    }

    /// In bounds and below the impassable cost.
    fn is_passable(&self, hex: Hex) -> bool {
        self.move_cost(hex)
            .is_some_and(|cost| cost < BattleConfig::IMPASSABLE_COST)
    }
}

/// Canonical terrain classes for battlefield hexes.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    strum::EnumString,
    strum::AsRefStr,
    strum::Display,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainKind {
    #[default]
    Plain,
    Forest,
    Hill,
    Sand,
    Water,
    Wall,
}

impl TerrainKind {
    pub const fn default_cost(self) -> u32 {
        match self {
            TerrainKind::Plain => 1,
            TerrainKind::Forest | TerrainKind::Hill | TerrainKind::Sand => 2,
            TerrainKind::Water => 3,
            TerrainKind::Wall => BattleConfig::IMPASSABLE_COST,
        }
    }
}

/// Movement cost per terrain kind. Kinds missing from the table fall back to
/// their default cost.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct TerrainCosts {
    costs: BTreeMap<TerrainKind, u32>,
}

impl TerrainCosts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: TerrainKind, cost: u32) -> Self {
        self.costs.insert(kind, cost);
        self
    }

    pub fn cost(&self, kind: TerrainKind) -> u32 {
        self.costs
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_cost())
    }
}

/// Concrete battlefield: a set of terrain tiles plus both deployment anchors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HexMap {
    tiles: BTreeMap<Hex, TerrainKind>,
    costs: TerrainCosts,
    player_anchor: Hex,
    enemy_anchor: Hex,
}

impl HexMap {
    pub fn new(
        tiles: impl IntoIterator<Item = (Hex, TerrainKind)>,
        costs: TerrainCosts,
        player_anchor: Hex,
        enemy_anchor: Hex,
    ) -> Self {
        Self {
            tiles: tiles.into_iter().collect(),
            costs,
            player_anchor,
            enemy_anchor,
        }
    }

    /// Hexagon-shaped plain field. Players deploy on the west edge, enemies on
    /// the east edge.
    pub fn hexagon(radius: u32, costs: TerrainCosts) -> Self {
        let edge = radius.saturating_sub(1) as i32;
        Self::new(
            Hex::ORIGIN.within(radius).map(|hex| (hex, TerrainKind::Plain)),
            costs,
            Hex::new(-edge, 0),
            Hex::new(edge, 0),
        )
    }

    /// Parallelogram of `width x height` plain hexes starting at the origin.
    pub fn rectangle(width: u32, height: u32, costs: TerrainCosts) -> Self {
        let tiles = (0..height as i32).flat_map(|r| {
            (0..width as i32).map(move |q| (Hex::new(q, r), TerrainKind::Plain))
        });
        let mid = (height / 2) as i32;
        Self::new(
            tiles,
            costs,
            Hex::new(0, mid),
            Hex::new(width.saturating_sub(1) as i32, mid),
        )
    }

    pub fn set_terrain(&mut self, hex: Hex, kind: TerrainKind) {
        self.tiles.insert(hex, kind);
    }

    pub fn with_terrain(mut self, hex: Hex, kind: TerrainKind) -> Self {
        self.set_terrain(hex, kind);
        self
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Hex, TerrainKind)> + '_ {
        self.tiles.iter().map(|(hex, kind)| (*hex, *kind))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn costs(&self) -> &TerrainCosts {
        &self.costs
    }

    pub fn player_anchor(&self) -> Hex {
        self.player_anchor
    }

    pub fn enemy_anchor(&self) -> Hex {
        self.enemy_anchor
    }

    /// Facing for units deployed around `anchor`: toward the opposing anchor.
    pub fn deployment_facing(&self, anchor: Hex) -> Direction {
        let other = if anchor == self.player_anchor {
            self.enemy_anchor
        } else {
            self.player_anchor
        };
        anchor.direction_to(other).unwrap_or_default()
    }
}

impl MapOracle for HexMap {
    fn terrain(&self, hex: Hex) -> Option<TerrainKind> {
        self.tiles.get(&hex).copied()
    }

    fn move_cost(&self, hex: Hex) -> Option<u32> {
        self.terrain(hex).map(|kind| self.costs.cost(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_costs_follow_terrain_table() {
        let costs = TerrainCosts::new();
        assert_eq!(costs.cost(TerrainKind::Plain), 1);
        assert_eq!(costs.cost(TerrainKind::Forest), 2);
        assert_eq!(costs.cost(TerrainKind::Water), 3);
        assert_eq!(costs.cost(TerrainKind::Wall), 99);
        assert_eq!(costs.with(TerrainKind::Water, 5).cost(TerrainKind::Water), 5);
    }

    #[test]
    fn walls_and_off_map_hexes_are_impassable() {
        let map = HexMap::hexagon(3, TerrainCosts::new()).with_terrain(Hex::new(1, 0), TerrainKind::Wall);
        assert!(map.is_passable(Hex::ORIGIN));
        assert!(!map.is_passable(Hex::new(1, 0)));
        assert!(!map.contains(Hex::new(5, 0)));
        assert_eq!(map.move_cost(Hex::new(5, 0)), None);
    }

    #[test]
    fn deployment_anchors_face_each_other() {
        let map = HexMap::hexagon(4, TerrainCosts::new());
        assert_eq!(map.player_anchor(), Hex::new(-3, 0));
        assert_eq!(map.deployment_facing(map.player_anchor()), Direction::East);
        assert_eq!(map.deployment_facing(map.enemy_anchor()), Direction::West);
    }
}
