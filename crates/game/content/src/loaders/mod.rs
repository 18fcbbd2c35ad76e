//! Content loaders for reading battle data from files.
//!
//! Each loader turns one RON/TOML file into tactics-core types. Errors carry
//! the offending path through `anyhow` context.

pub mod battle;
pub mod catalog;
pub mod factory;
pub mod map;
pub mod terrain;

pub use battle::{BattleFile, BattleLoader, ScenarioSpec};
pub use catalog::{CatalogLoader, PassiveLoader, SkillLoader, UnitLoader};
pub use factory::{Content, ContentFactory};
pub use map::{MapLoader, MapShape};
pub use terrain::TerrainLoader;

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Parses a RON document, naming `what` and the path on failure.
pub(crate) fn parse_ron<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> LoadResult<T> {
    let content = read_file(path)?;
    ron::from_str(&content)
        .with_context(|| format!("failed to parse {what} RON at {}", path.display()))
}

/// Parses a TOML document, naming `what` and the path on failure.
pub(crate) fn parse_toml<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> LoadResult<T> {
    let content = read_file(path)?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse {what} TOML at {}", path.display()))
}
