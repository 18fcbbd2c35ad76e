//! Read-only queries shared by goal selection and planning.

use crate::combat::{AttackProfile, FacingRelation, expected_damage};
use crate::config::BattleConfig;
use crate::env::MapOracle;
use crate::hex::{Hex, Reachable};
use crate::resolver::reachable_for;
use crate::skill::Skill;
use crate::state::{BattleState, Unit, UnitId};

/// Battle view for one acting unit.
pub struct AiContext<'a> {
    pub actor: &'a Unit,
    pub state: &'a BattleState,
    pub map: &'a dyn MapOracle,
    pub config: &'a BattleConfig,
    /// Usable skills, hostile ones ordered by magnitude, basic attack last.
    pub skills: Vec<Skill>,
    pub reachable: Reachable,
}

impl<'a> AiContext<'a> {
    pub fn new(
        actor: &'a Unit,
        state: &'a BattleState,
        map: &'a dyn MapOracle,
        config: &'a BattleConfig,
    ) -> Self {
        let mut skills = actor.usable_skills();
        // Stable: equal magnitudes keep catalog order, basic attack stays last.
        skills.sort_by(|a, b| {
            a.is_basic_attack()
                .cmp(&b.is_basic_attack())
                .then(b.main.magnitude.total_cmp(&a.main.magnitude))
        });
        let reachable = reachable_for(state, map, actor);
        Self {
            actor,
            state,
            map,
            config,
            skills,
            reachable,
        }
    }

    pub fn can_move(&self) -> bool {
        !self.reachable.is_empty()
    }

    /// Living opponents the actor may target.
    pub fn visible_opponents(&self) -> impl Iterator<Item = &'a Unit> + '_ {
        let team = self.actor.team;
        self.state
            .living()
            .filter(move |u| u.team != team && !u.buffs.is_hidden())
    }

    pub fn allies(&self) -> impl Iterator<Item = &'a Unit> + '_ {
        self.state.living_on(self.actor.team)
    }

    pub fn nearest_opponent(&self) -> Option<&'a Unit> {
        self.visible_opponents()
            .min_by_key(|u| u.position.distance(self.actor.position))
    }

    pub fn hostile_skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter().filter(|s| s.main.is_hostile())
    }

    pub fn heal_skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter().filter(|s| s.main.kind.is_heal())
    }

    /// Whether `skill` cast from `from` reaches `target` without a dash.
    pub fn in_range(skill: &Skill, from: Hex, target: Hex) -> bool {
        skill.main.target.is_global() || from.distance(target) <= skill.range
    }

    /// Highest-magnitude hostile skill that reaches `target` from `from`.
    pub fn best_attack_from(&self, from: Hex, target: Hex) -> Option<&Skill> {
        self.hostile_skills()
            .find(|skill| Self::in_range(skill, from, target))
    }

    /// Longest hostile reach, used for positioning.
    pub fn attack_range(&self) -> u32 {
        self.hostile_skills()
            .map(|s| s.range)
            .max()
            .unwrap_or(self.actor.attack_range)
    }

    /// Best deterministic damage estimate any usable hostile skill deals to
    /// `target` from where the actor stands.
    pub fn expected_damage_to(&self, target: &Unit) -> i32 {
        let attacker = self.actor.combatant(self.config);
        let defender = target.combatant(self.config);
        let facing =
            FacingRelation::between(target.position, target.facing, self.actor.position);
        self.hostile_skills()
            .filter(|skill| skill.main.kind.is_damage())
            .map(|skill| {
                let profile =
                    AttackProfile::new(skill.category, skill.element, skill.main.magnitude);
                expected_damage(&attacker, &defender, &profile, facing)
            })
            .max()
            .unwrap_or(0)
    }

    /// Distance from `hex` to the closest visible opponent.
    pub fn threat_distance(&self, hex: Hex) -> u32 {
        self.visible_opponents()
            .map(|u| u.position.distance(hex))
            .min()
            .unwrap_or(u32::MAX)
    }

    pub fn unit(&self, id: UnitId) -> Option<&'a Unit> {
        self.state.unit(id)
    }
}
