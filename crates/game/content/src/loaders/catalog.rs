//! Unit, skill and passive catalog loaders.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use tactics_core::{Passive, Skill, StaticCatalog, UnitTemplate};

use crate::loaders::{LoadResult, parse_ron};

/// `units.ron` layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitCatalog {
    pub units: Vec<UnitTemplate>,
}

/// `skills.ron` layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCatalog {
    pub skills: Vec<Skill>,
}

/// `passives.ron` layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassiveCatalog {
    pub passives: Vec<Passive>,
}

/// Loader for unit templates from RON files.
pub struct UnitLoader;

impl UnitLoader {
    /// Template names default to their keys.
    pub fn load(path: &Path) -> LoadResult<Vec<UnitTemplate>> {
        let catalog: UnitCatalog = parse_ron(path, "unit catalog")?;
        let mut units = catalog.units;
        for unit in &mut units {
            if unit.key.is_empty() {
                bail!("unit template without a key in {}", path.display());
            }
            if unit.name.is_empty() {
                unit.name = unit.key.clone();
            }
        }
        Ok(units)
    }
}

/// Loader for skill templates from RON files.
pub struct SkillLoader;

impl SkillLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<Skill>> {
        let catalog: SkillCatalog = parse_ron(path, "skill catalog")?;
        let mut skills = catalog.skills;
        for skill in &mut skills {
            if skill.id.is_empty() {
                bail!("skill without an id in {}", path.display());
            }
            if skill.id == Skill::BASIC_ATTACK {
                bail!("`{}` is implicit and cannot be redefined", Skill::BASIC_ATTACK);
            }
            if skill.name.is_empty() {
                skill.name = skill.id.clone();
            }
        }
        Ok(skills)
    }
}

/// Loader for passive traits from RON files.
pub struct PassiveLoader;

impl PassiveLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<Passive>> {
        let catalog: PassiveCatalog = parse_ron(path, "passive catalog")?;
        Ok(catalog.passives)
    }
}

/// Assembles a [`StaticCatalog`] and checks every cross reference.
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn load(units: &Path, skills: &Path, passives: &Path) -> LoadResult<StaticCatalog> {
        Self::assemble(
            UnitLoader::load(units)?,
            SkillLoader::load(skills)?,
            PassiveLoader::load(passives)?,
        )
    }

    /// Rejects duplicate keys and templates naming unknown skills or
    /// passives.
    pub fn assemble(
        units: Vec<UnitTemplate>,
        skills: Vec<Skill>,
        passives: Vec<Passive>,
    ) -> LoadResult<StaticCatalog> {
        let mut skill_ids = BTreeSet::new();
        for skill in &skills {
            if !skill_ids.insert(skill.id.as_str()) {
                bail!("duplicate skill id `{}`", skill.id);
            }
        }
        let mut passive_keys = BTreeSet::new();
        for passive in &passives {
            if !passive_keys.insert(passive.key.as_str()) {
                bail!("duplicate passive key `{}`", passive.key);
            }
        }

        let mut unit_keys = BTreeSet::new();
        for unit in &units {
            if !unit_keys.insert(unit.key.as_str()) {
                bail!("duplicate unit key `{}`", unit.key);
            }
            if let Some(missing) = unit.skills.iter().find(|id| !skill_ids.contains(id.as_str())) {
                bail!("unit `{}` references unknown skill `{missing}`", unit.key);
            }
            if let Some(missing) = unit
                .passives
                .iter()
                .find(|key| !passive_keys.contains(key.as_str()))
            {
                bail!("unit `{}` references unknown passive `{missing}`", unit.key);
            }
        }

        let mut catalog = StaticCatalog::new();
        for skill in skills {
            catalog.insert_skill(skill);
        }
        for passive in passives {
            catalog.insert_passive(passive);
        }
        for unit in units {
            catalog.insert_unit(unit);
        }
        tracing::debug!(entries = catalog.len(), "catalog assembled");
        Ok(catalog)
    }
}
