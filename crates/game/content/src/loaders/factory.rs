//! Content factory for building a battle's static inputs from a data
//! directory.

use std::path::{Path, PathBuf};

use tactics_core::{HexMap, StaticCatalog, TerrainCosts};

use crate::loaders::{BattleFile, BattleLoader, CatalogLoader, LoadResult, MapLoader, TerrainLoader};

/// Everything loaded from one data directory.
#[derive(Debug, Clone)]
pub struct Content {
    pub catalog: StaticCatalog,
    pub map: HexMap,
    pub battle: BattleFile,
}

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── units.ron
/// ├── skills.ron
/// ├── passives.ron
/// ├── map.ron
/// ├── terrain.toml
/// └── battle.toml
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Loads unit, skill and passive templates and cross-checks them.
    pub fn load_catalog(&self) -> LoadResult<StaticCatalog> {
        CatalogLoader::load(
            &self.data_dir.join("units.ron"),
            &self.data_dir.join("skills.ron"),
            &self.data_dir.join("passives.ron"),
        )
    }

    /// Load movement costs from `terrain.toml`; a missing file means
    /// default costs.
    pub fn load_terrain(&self) -> LoadResult<TerrainCosts> {
        let path = self.data_dir.join("terrain.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no terrain table, using defaults");
            return Ok(TerrainCosts::new());
        }
        TerrainLoader::load(&path)
    }

    pub fn load_map(&self, costs: TerrainCosts) -> LoadResult<HexMap> {
        MapLoader::load(&self.data_dir.join("map.ron"), costs)
    }

    pub fn load_battle(&self) -> LoadResult<BattleFile> {
        BattleLoader::load(&self.data_dir.join("battle.toml"))
    }

    pub fn load(&self) -> LoadResult<Content> {
        let catalog = self.load_catalog()?;
        let map = self.load_map(self.load_terrain()?)?;
        let battle = self.load_battle()?;
        tracing::info!(dir = %self.data_dir.display(), "content loaded");
        Ok(Content {
            catalog,
            map,
            battle,
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }
}
