//! Goal selection.
//!
//! Goals are picked in priority order: status-forced behavior first
//! (confusion, fear), then the side-specific objective.

use super::AiContext;
use crate::state::{Team, UnitId};
use crate::status::BuffKind;

/// What the acting unit is trying to achieve this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Goal {
    /// Confused: stumble to a random neighbor and lash out.
    Stumble,
    /// Feared: get as far from `threat` as possible.
    FleeFrom { threat: UnitId },
    /// Restore an ally's HP.
    Heal { ally: UnitId },
    Attack { target: UnitId },
    Idle,
}

pub struct GoalSelector;

impl GoalSelector {
    /// `auto_ally` selects the player-side auto-play policy.
    pub fn select(ctx: &AiContext<'_>, auto_ally: bool) -> Goal {
        let actor = ctx.actor;
        if actor.has(BuffKind::Confuse) {
            tracing::debug!(unit = %actor.id, "goal: stumble (confused)");
            return Goal::Stumble;
        }
        if actor.has(BuffKind::Fear) {
            let goal = ctx
                .nearest_opponent()
                .map_or(Goal::Idle, |u| Goal::FleeFrom { threat: u.id });
            tracing::debug!(unit = %actor.id, ?goal, "goal: flee (feared)");
            return goal;
        }

        let goal = if auto_ally && actor.team == Team::Player {
            Self::ally_goal(ctx)
        } else {
            Self::enemy_goal(ctx)
        };
        tracing::debug!(unit = %actor.id, ?goal, "goal selected");
        goal
    }

    /// Taunt, then a guaranteed kill, then the nearest opponent.
    fn enemy_goal(ctx: &AiContext<'_>) -> Goal {
        let taunter = ctx
            .actor
            .buffs
            .get(BuffKind::Taunt)
            .and_then(|buff| buff.caster)
            .filter(|id| ctx.visible_opponents().any(|u| u.id == *id));
        if let Some(target) = taunter {
            return Goal::Attack { target };
        }

        let kill = ctx.visible_opponents().find(|target| {
            let estimate = ctx.expected_damage_to(target);
            tracing::trace!(target = %target.id, estimate, hp = target.hp, "kill check");
            estimate >= target.hp
        });
        if let Some(target) = kill {
            return Goal::Attack { target: target.id };
        }

        ctx.nearest_opponent()
            .map_or(Goal::Idle, |u| Goal::Attack { target: u.id })
    }

    /// Heal a wounded ally when possible, otherwise pressure the weakest
    /// opponent.
    fn ally_goal(ctx: &AiContext<'_>) -> Goal {
        if ctx.heal_skills().next().is_some() {
            let wounded = ctx
                .allies()
                .filter(|u| u.hp_ratio() < ctx.config.heal_threshold)
                .min_by(|a, b| a.hp_ratio().total_cmp(&b.hp_ratio()));
            if let Some(ally) = wounded {
                return Goal::Heal { ally: ally.id };
            }
        }
        Self::weakest_opponent(ctx).map_or(Goal::Idle, |target| Goal::Attack { target })
    }

    /// Visible opponent with the lowest HP ratio.
    pub fn weakest_opponent(ctx: &AiContext<'_>) -> Option<UnitId> {
        ctx.visible_opponents()
            .min_by(|a, b| a.hp_ratio().total_cmp(&b.hp_ratio()))
            .map(|u| u.id)
    }
}
