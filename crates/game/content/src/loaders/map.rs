//! Map layout loader.
//!
//! A map is a base shape of plain hexes, explicit terrain overrides and the
//! two deployment anchors. Movement costs come from the terrain table.

use std::path::Path;

use anyhow::ensure;
use serde::{Deserialize, Serialize};
use tactics_core::{Hex, HexMap, MapOracle, TerrainCosts, TerrainKind};

use crate::loaders::{LoadResult, parse_ron};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapShape {
    Hexagon { radius: u32 },
    Rectangle { width: u32, height: u32 },
}

/// Map data structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MapDataRon {
    shape: MapShape,
    #[serde(default)]
    player_anchor: Option<(i32, i32)>,
    #[serde(default)]
    enemy_anchor: Option<(i32, i32)>,
    /// `(q, r, terrain)`; hexes outside the base shape are added.
    #[serde(default)]
    tiles: Vec<(i32, i32, TerrainKind)>,
}

/// Loader for map layouts from RON files.
pub struct MapLoader;

impl MapLoader {
    pub fn load(path: &Path, costs: TerrainCosts) -> LoadResult<HexMap> {
        let data: MapDataRon = parse_ron(path, "map")?;
        Self::build(data, costs)
    }

    fn build(data: MapDataRon, costs: TerrainCosts) -> LoadResult<HexMap> {
        let base = match data.shape {
            MapShape::Hexagon { radius } => HexMap::hexagon(radius, costs.clone()),
            MapShape::Rectangle { width, height } => {
                HexMap::rectangle(width, height, costs.clone())
            }
        };
        let player = data
            .player_anchor
            .map_or(base.player_anchor(), |(q, r)| Hex::new(q, r));
        let enemy = data
            .enemy_anchor
            .map_or(base.enemy_anchor(), |(q, r)| Hex::new(q, r));

        let mut map = HexMap::new(base.tiles(), costs, player, enemy);
        for (q, r, kind) in data.tiles {
            map.set_terrain(Hex::new(q, r), kind);
        }

        ensure!(map.is_passable(player), "player anchor {player} is not a passable hex");
        ensure!(map.is_passable(enemy), "enemy anchor {enemy} is not a passable hex");
        tracing::debug!(tiles = map.len(), %player, %enemy, "map loaded");
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_and_anchors() {
        let data: MapDataRon = ron::from_str(
            "(shape: Hexagon(radius: 3), enemy_anchor: Some((1, 1)), tiles: [(0, 0, Water), (5, 0, Plain)])",
        )
        .expect("parses");
        let map = MapLoader::build(data, TerrainCosts::new()).expect("builds");
        assert_eq!(map.terrain(Hex::ORIGIN), Some(TerrainKind::Water));
        assert!(map.contains(Hex::new(5, 0)));
        assert_eq!(map.player_anchor(), Hex::new(-2, 0));
        assert_eq!(map.enemy_anchor(), Hex::new(1, 1));
    }

    #[test]
    fn walled_anchor_is_rejected() {
        let data: MapDataRon =
            ron::from_str("(shape: Rectangle(width: 4, height: 3), tiles: [(0, 1, Wall)])")
                .expect("parses");
        assert!(MapLoader::build(data, TerrainCosts::new()).is_err());
    }
}
