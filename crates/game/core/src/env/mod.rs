//! Read-only battle environment.
//!
//! Oracles expose static data (the catalog of templates and the battlefield
//! map) and the roll source used for every random decision.
mod catalog;
mod map;
mod rng;

pub use catalog::{CatalogOracle, StaticCatalog, UnitTemplate};
pub use map::{HexMap, MapOracle, TerrainCosts, TerrainKind};
pub use rng::{BattleRng, RollSource, ScriptedRolls};
