//! Battle configuration and scenario loader.

use std::path::Path;

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};
use tactics_core::engine::unit_from_template;
use tactics_core::{
    BattleConfig, BattleSetup, CatalogOracle, PlayerRoster, SpawnSpec, Team, UnitId,
    parse_spawn_list,
};

use crate::loaders::{LoadResult, parse_toml};

/// Who fights: party template keys and the enemy spawn list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub party: Vec<String>,
    /// Spawn notation, e.g. `goblin*2, archer:3:-1`.
    pub enemies: String,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub stage_cleared: bool,
}

impl ScenarioSpec {
    pub fn spawns(&self) -> LoadResult<Vec<SpawnSpec>> {
        parse_spawn_list(&self.enemies)
            .with_context(|| format!("invalid enemy list `{}`", self.enemies))
    }

    /// Builds a fresh roster from the party templates and the matching setup.
    pub fn recruit(&self, catalog: &dyn CatalogOracle) -> LoadResult<(PlayerRoster, BattleSetup)> {
        let mut roster = PlayerRoster::new();
        let mut party = Vec::with_capacity(self.party.len());
        for key in &self.party {
            let template = catalog
                .unit(key)
                .with_context(|| format!("party member `{key}` is not in the catalog"))?;
            let unit = unit_from_template(UnitId(0), template, Team::Player, catalog)
                .with_context(|| format!("failed to build party member `{key}`"))?;
            party.push(roster.recruit(unit));
        }
        let setup = BattleSetup {
            party,
            enemies: self.spawns()?,
            seed: self.seed,
            stage_cleared: self.stage_cleared,
        };
        Ok((roster, setup))
    }
}

/// `battle.toml` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleFile {
    #[serde(default)]
    pub config: BattleConfig,
    pub scenario: ScenarioSpec,
}

/// Loader for battle configuration from TOML files.
pub struct BattleLoader;

impl BattleLoader {
    pub fn load(path: &Path) -> LoadResult<BattleFile> {
        let file: BattleFile = parse_toml(path, "battle")?;
        Self::validate(&file.config)?;
        Ok(file)
    }

    fn validate(config: &BattleConfig) -> LoadResult<()> {
        ensure!(
            config.gauge_threshold > 0.0,
            "gauge_threshold must be positive"
        );
        ensure!(
            (0.0..=1.0).contains(&config.heal_threshold),
            "heal_threshold must be a ratio in [0, 1]"
        );
        ensure!(
            config.chain_falloff > 0.0,
            "chain_falloff must be positive"
        );
        Ok(())
    }
}
