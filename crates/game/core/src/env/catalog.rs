use std::collections::BTreeMap;

use crate::combat::Element;
use crate::skill::Skill;
use crate::state::{EquipmentItem, Passive};
use crate::stats::Attributes;

/// Static catalog of unit, skill and passive templates.
///
/// Injected by reference when a battle starts; the core never reaches for
/// global data.
pub trait CatalogOracle: Send + Sync {
    fn unit(&self, key: &str) -> Option<&UnitTemplate>;
    fn skill(&self, id: &str) -> Option<&Skill>;
    fn passive(&self, key: &str) -> Option<&Passive>;
}

/// Blueprint for building a fresh unit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct UnitTemplate {
    pub key: String,
    pub name: String,
    pub level: u32,
    pub attributes: Attributes,
    pub base_hp: i32,
    pub base_mp: i32,
    pub movement: u32,
    pub attack_range: u32,
    pub element: Element,
    /// Skill ids resolved against the catalog.
    pub skills: Vec<String>,
    /// Passive keys resolved against the catalog.
    pub passives: Vec<String>,
    pub equipment: Vec<EquipmentItem>,
    pub gold: u32,
}

impl UnitTemplate {
    pub fn new(key: impl Into<String>, attributes: Attributes) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            attributes,
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_movement(mut self, movement: u32) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_attack_range(mut self, range: u32) -> Self {
        self.attack_range = range;
        self
    }

    pub fn with_skill(mut self, id: impl Into<String>) -> Self {
        self.skills.push(id.into());
        self
    }

    pub fn with_passive(mut self, key: impl Into<String>) -> Self {
        self.passives.push(key.into());
        self
    }

    pub fn with_gold(mut self, gold: u32) -> Self {
        self.gold = gold;
        self
    }
}

impl Default for UnitTemplate {
    fn default() -> Self {
        Self {
            key: String::new(),
            name: String::new(),
            level: 1,
            attributes: Attributes::uniform(10),
            base_hp: 0,
            base_mp: 0,
            movement: 3,
            attack_range: 1,
            element: Element::Neutral,
            skills: Vec::new(),
            passives: Vec::new(),
            equipment: Vec::new(),
            gold: 0,
        }
    }
}

/// In-memory catalog, typically filled by the content loaders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticCatalog {
    units: BTreeMap<String, UnitTemplate>,
    skills: BTreeMap<String, Skill>,
    passives: BTreeMap<String, Passive>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_unit(&mut self, template: UnitTemplate) {
        self.units.insert(template.key.clone(), template);
    }

    pub fn insert_skill(&mut self, skill: Skill) {
        self.skills.insert(skill.id.clone(), skill);
    }

    pub fn insert_passive(&mut self, passive: Passive) {
        self.passives.insert(passive.key.clone(), passive);
    }

    pub fn with_unit(mut self, template: UnitTemplate) -> Self {
        self.insert_unit(template);
        self
    }

    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.insert_skill(skill);
        self
    }

    pub fn with_passive(mut self, passive: Passive) -> Self {
        self.insert_passive(passive);
        self
    }

    pub fn unit_keys(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.units.len() + self.skills.len() + self.passives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CatalogOracle for StaticCatalog {
    fn unit(&self, key: &str) -> Option<&UnitTemplate> {
        self.units.get(key)
    }

    fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.get(id)
    }

    fn passive(&self, key: &str) -> Option<&Passive> {
        self.passives.get(key)
    }
}
