//! Terrain cost table loader.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tactics_core::{TerrainCosts, TerrainKind};

use crate::loaders::{LoadResult, parse_toml};

/// `terrain.toml` layout. Keys are terrain names in any case:
///
/// ```toml
/// [costs]
/// forest = 2
/// water = 4
/// ```
#[derive(Debug, Default, Deserialize)]
struct TerrainFile {
    #[serde(default)]
    costs: BTreeMap<String, u32>,
}

/// Loader for movement costs from TOML files.
pub struct TerrainLoader;

impl TerrainLoader {
    /// Kinds the file leaves out keep their default cost.
    pub fn load(path: &Path) -> LoadResult<TerrainCosts> {
        let file: TerrainFile = parse_toml(path, "terrain")?;
        Self::from_table(file.costs)
    }

    fn from_table(table: BTreeMap<String, u32>) -> LoadResult<TerrainCosts> {
        let mut costs = TerrainCosts::new();
        for (name, cost) in table {
            let kind: TerrainKind = name
                .parse()
                .ok()
                .with_context(|| format!("unknown terrain kind `{name}`"))?;
            costs = costs.with(kind, cost);
        }
        Ok(costs)
    }
}
