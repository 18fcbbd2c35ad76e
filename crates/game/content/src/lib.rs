//! Data-driven battle content and loaders.
//!
//! This crate loads the static inputs of a battle from RON/TOML data files:
//! - Unit templates, skills and passives (RON), assembled into a catalog
//! - Map layouts (RON) with terrain movement costs (TOML)
//! - Battle configuration and the scenario to fight (TOML)
//!
//! Content is consumed through tactics-core oracles and never appears in
//! battle state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    BattleFile, BattleLoader, CatalogLoader, Content, ContentFactory, LoadResult, MapLoader,
    MapShape, PassiveLoader, ScenarioSpec, SkillLoader, TerrainLoader, UnitLoader,
};
