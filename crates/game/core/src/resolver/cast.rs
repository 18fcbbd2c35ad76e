//! Skill casting: validate, dash, main effect, sub effect, commit.
//!
//! Validation is pure and produces a [`CastPlan`]. The session runs the
//! remaining stages as separate queued tasks so the sub effect resolves one
//! scheduling step after the main effect.

use super::CombatContext;
use super::targeting::collect_targets;
use crate::engine::BattleEvent;
use crate::error::CommandError;
use crate::hex::Hex;
use crate::skill::{EffectKind, Skill, TargetMode};
use crate::state::{TurnFlags, Unit, UnitId};

/// A validated cast, ready to resolve.
#[derive(Clone, Debug, PartialEq)]
pub struct CastPlan {
    pub caster: UnitId,
    pub skill: Skill,
    /// Clicked hex; the caster's own hex for global modes.
    pub target: Hex,
    /// Hexes walked before the strike, empty when no dash is needed.
    pub dash: Vec<Hex>,
}

impl CastPlan {
    pub fn has_sub(&self) -> bool {
        self.skill.sub.is_some()
    }
}

/// Effects aimed at a hex rather than a unit.
fn targets_ground(kind: EffectKind) -> bool {
    matches!(kind, EffectKind::Teleport | EffectKind::PlaceTrap { .. })
}

impl CombatContext<'_> {
    /// Checks whether the current actor `caster` may cast `skill_id` at
    /// `target` and plans any dash it needs.
    pub fn plan_cast(
        &self,
        caster: UnitId,
        skill_id: &str,
        target: Hex,
    ) -> Result<CastPlan, CommandError> {
        let unit = self.state.unit(caster).ok_or(CommandError::UnitNotFound(caster))?;
        let turn = self
            .state
            .turn
            .as_ref()
            .filter(|turn| turn.actor == caster)
            .ok_or(CommandError::NoActiveTurn)?;
        if turn.flags.contains(TurnFlags::ACTED) {
            return Err(CommandError::AlreadyActed);
        }
        let skill = unit
            .skill(skill_id)
            .ok_or_else(|| CommandError::UnknownSkill(skill_id.to_string()))?;
        unit.check_usable(&skill)?;

        let main = skill.main;
        let ground = targets_ground(main.kind);
        if main.target.is_global() && !ground {
            return Ok(CastPlan {
                caster,
                target: unit.position,
                skill,
                dash: Vec::new(),
            });
        }

        let distance = unit.position.distance(target);
        let mut dash = Vec::new();
        if distance > skill.range {
            let can_dash = skill.melee && !turn.flags.contains(TurnFlags::MOVED) && !ground;
            if !can_dash {
                return Err(CommandError::OutOfRange {
                    distance,
                    range: skill.range,
                });
            }
            dash = self.dash_path(unit, target)?;
        }

        self.check_target(unit, &skill, target)?;
        Ok(CastPlan {
            caster,
            skill,
            target,
            dash,
        })
    }

    fn check_target(&self, unit: &Unit, skill: &Skill, target: Hex) -> Result<(), CommandError> {
        let main = &skill.main;
        let valid = match main.kind {
            EffectKind::Teleport => self.is_open(target, Some(unit.id)),
            EffectKind::PlaceTrap { .. } => {
                self.map.is_passable(target) && self.state.trap_at(target).is_none()
            }
            _ => match main.target {
                TargetMode::SingleEnemy | TargetMode::SingleAlly => {
                    !collect_targets(self.state, unit, main, target).is_empty()
                }
                _ => self.map.contains(target),
            },
        };
        if valid {
            Ok(())
        } else {
            Err(CommandError::InvalidTarget(target))
        }
    }

    /// Dash, facing, announcement and main effect.
    pub fn perform_main(&mut self, plan: &CastPlan) {
        let caster = plan.caster;
        if !plan.dash.is_empty() {
            if let Some(turn) = self.state.turn.as_mut() {
                turn.flags.insert(TurnFlags::MOVED);
            }
            self.walk(caster, &plan.dash);
        }
        let Some(unit) = self.state.unit_mut(caster).filter(|u| u.is_alive()) else {
            return;
        };
        if let Some(direction) = unit.position.direction_to(plan.target) {
            unit.facing = direction;
        }
        let position = unit.position;

        self.events.push(BattleEvent::SkillUsed {
            unit: caster,
            skill: plan.skill.id.clone(),
            target: plan.target,
        });

        let reach = position.distance(plan.target);
        if !plan.skill.main.target.is_global() && reach > plan.skill.range {
            self.events
                .info(format!("{caster} was stopped short of {}", plan.target));
            return;
        }
        self.apply_effect(caster, &plan.skill, &plan.skill.main, plan.target);
    }

    pub fn apply_sub(&mut self, plan: &CastPlan) {
        if let Some(sub) = plan.skill.sub {
            self.apply_effect(plan.caster, &plan.skill, &sub, plan.target);
        }
    }

    /// Pays MP, records the gauge cost, starts the cooldown and marks the
    /// turn as acted.
    pub fn commit_cast(&mut self, plan: &CastPlan) {
        let skill = &plan.skill;
        if let Some(unit) = self.state.unit_mut(plan.caster) {
            if skill.cooldown > 0 {
                unit.cooldowns.insert(skill.id.clone(), skill.cooldown);
            }
            let paid = unit.change_mp(-(skill.mp_cost as i32));
            let mp_after = unit.mp;
            if paid != 0 {
                self.events.push(BattleEvent::MpChanged {
                    target: plan.caster,
                    delta: paid,
                    mp_after,
                });
            }
        }
        if let Some(turn) = self
            .state
            .turn
            .as_mut()
            .filter(|turn| turn.actor == plan.caster)
        {
            turn.flags.insert(TurnFlags::ACTED);
            turn.action_cost = Some(skill.gauge_cost);
            turn.selected = None;
        }
    }

    /// Runs every stage back to back.
    pub fn cast(&mut self, plan: &CastPlan) {
        self.perform_main(plan);
        self.apply_sub(plan);
        self.commit_cast(plan);
    }
}
