//! Decision procedure for enemy units and player-side auto-play.
//!
//! 1. **Context**: usable skills, reachable hexes and visible opponents are
//!    gathered once into an [`AiContext`].
//! 2. **Goal selection**: [`GoalSelector`] picks one [`Goal`].
//! 3. **Planning**: the goal becomes an [`AiPlan`], an optional move plus an
//!    optional skill cast. The session executes plans through the same
//!    validated commands a player would issue.

mod context;
mod goal;

pub use context::AiContext;
pub use goal::{Goal, GoalSelector};

use crate::config::BattleConfig;
use crate::env::{MapOracle, RollSource};
use crate::hex::Hex;
use crate::skill::{Skill, TargetMode};
use crate::state::{BattleState, UnitId};

/// Skill cast chosen by the controller.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannedAction {
    pub skill: String,
    pub target: Hex,
}

/// One turn's decision.
#[derive(Clone, Debug, PartialEq)]
pub struct AiPlan {
    pub goal: Goal,
    pub move_to: Option<Hex>,
    pub action: Option<PlannedAction>,
}

impl AiPlan {
    fn idle(goal: Goal) -> Self {
        Self {
            goal,
            move_to: None,
            action: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.move_to.is_none() && self.action.is_none()
    }
}

pub struct AiController<'a> {
    state: &'a BattleState,
    map: &'a dyn MapOracle,
    config: &'a BattleConfig,
}

impl<'a> AiController<'a> {
    pub fn new(state: &'a BattleState, map: &'a dyn MapOracle, config: &'a BattleConfig) -> Self {
        Self { state, map, config }
    }

    /// Plans `actor`'s turn. `auto_ally` switches player units to the
    /// auto-play policy; enemy units always hunt.
    pub fn plan(&self, actor: UnitId, auto_ally: bool, rolls: &mut dyn RollSource) -> AiPlan {
        let Some(unit) = self.state.unit(actor).filter(|u| u.is_alive()) else {
            return AiPlan::idle(Goal::Idle);
        };
        let ctx = AiContext::new(unit, self.state, self.map, self.config);
        let goal = GoalSelector::select(&ctx, auto_ally);

        let plan = match goal {
            Goal::Stumble => stumble(&ctx, rolls),
            Goal::FleeFrom { .. } => flee(&ctx, goal),
            Goal::Heal { ally } => {
                heal(&ctx, ally).unwrap_or_else(|| match GoalSelector::weakest_opponent(&ctx) {
                    Some(target) => attack(&ctx, target, auto_ally),
                    None => AiPlan::idle(goal),
                })
            }
            Goal::Attack { target } => attack(&ctx, target, auto_ally),
            Goal::Idle => AiPlan::idle(goal),
        };
        tracing::debug!(
            unit = %actor,
            goal = ?plan.goal,
            move_to = ?plan.move_to,
            action = ?plan.action,
            "ai plan"
        );
        plan
    }
}

/// Random free neighbor, then a basic attack on a random adjacent unit.
fn stumble(ctx: &AiContext<'_>, rolls: &mut dyn RollSource) -> AiPlan {
    let origin = ctx.actor.position;
    let steps: Vec<Hex> = origin
        .neighbors()
        .into_iter()
        .filter(|hex| ctx.reachable.contains(*hex))
        .collect();
    let move_to = (!steps.is_empty()).then(|| steps[rolls.index(steps.len())]);
    let stand = move_to.unwrap_or(origin);

    let victims: Vec<Hex> = ctx
        .state
        .living()
        .filter(|u| u.id != ctx.actor.id && u.position.distance(stand) == 1)
        .map(|u| u.position)
        .collect();
    let can_attack = ctx.skills.iter().any(Skill::is_basic_attack);
    let action = (can_attack && !victims.is_empty()).then(|| PlannedAction {
        skill: Skill::BASIC_ATTACK.to_string(),
        target: victims[rolls.index(victims.len())],
    });
    AiPlan {
        goal: Goal::Stumble,
        move_to,
        action,
    }
}

/// Reachable hex farthest from the nearest opponent; no action.
fn flee(ctx: &AiContext<'_>, goal: Goal) -> AiPlan {
    let mut best = ctx.actor.position;
    let mut best_distance = ctx.threat_distance(best);
    for (hex, _) in ctx.reachable.iter() {
        let distance = ctx.threat_distance(hex);
        if distance > best_distance {
            best = hex;
            best_distance = distance;
        }
    }
    AiPlan {
        goal,
        move_to: (best != ctx.actor.position).then_some(best),
        action: None,
    }
}

fn heal_target_hex(skill: &Skill, actor_at: Hex, ally_at: Hex) -> Hex {
    match skill.main.target {
        TargetMode::SelfOnly | TargetMode::AllAllies | TargetMode::AllEnemies => actor_at,
        _ => ally_at,
    }
}

/// Heals `ally` from here, or from the cheapest reachable hex in range.
fn heal(ctx: &AiContext<'_>, ally: UnitId) -> Option<AiPlan> {
    let patient = ctx.unit(ally)?;
    let actor = ctx.actor;
    let usable = |skill: &&Skill| {
        skill.main.target != TargetMode::SelfOnly || patient.id == actor.id
    };

    if let Some(skill) = ctx
        .heal_skills()
        .filter(usable)
        .find(|s| AiContext::in_range(s, actor.position, patient.position))
    {
        return Some(AiPlan {
            goal: Goal::Heal { ally },
            move_to: None,
            action: Some(PlannedAction {
                skill: skill.id.clone(),
                target: heal_target_hex(skill, actor.position, patient.position),
            }),
        });
    }

    let (stand, skill) = ctx
        .reachable
        .iter()
        .filter_map(|(hex, cost)| {
            ctx.heal_skills()
                .filter(usable)
                .find(|s| AiContext::in_range(s, hex, patient.position))
                .map(|skill| (cost, hex, skill))
        })
        .min_by_key(|(cost, hex, _)| (*cost, *hex))
        .map(|(_, hex, skill)| (hex, skill))?;
    Some(AiPlan {
        goal: Goal::Heal { ally },
        move_to: Some(stand),
        action: Some(PlannedAction {
            skill: skill.id.clone(),
            target: heal_target_hex(skill, stand, patient.position),
        }),
    })
}

/// Strikes `target` now if possible, otherwise closes in first.
///
/// Enemies step to the reachable hex that strictly reduces the distance the
/// most. Auto-played allies score hexes: in range scores
/// `AI_POSITION_BASE + AI_IN_RANGE_BONUS`, otherwise
/// `AI_POSITION_BASE - remaining distance`.
fn attack(ctx: &AiContext<'_>, target: UnitId, auto_ally: bool) -> AiPlan {
    let goal = Goal::Attack { target };
    let Some(victim) = ctx.unit(target) else {
        return AiPlan::idle(goal);
    };
    let origin = ctx.actor.position;
    let aim = victim.position;

    if let Some(skill) = ctx.best_attack_from(origin, aim) {
        return AiPlan {
            goal,
            move_to: None,
            action: Some(PlannedAction {
                skill: skill.id.clone(),
                target: aim,
            }),
        };
    }
    if !ctx.can_move() {
        return AiPlan::idle(goal);
    }

    let stand = if auto_ally {
        position_by_score(ctx, aim)
    } else {
        step_closer(ctx, aim)
    };
    let Some(stand) = stand else {
        return AiPlan::idle(goal);
    };
    let action = ctx.best_attack_from(stand, aim).map(|skill| PlannedAction {
        skill: skill.id.clone(),
        target: aim,
    });
    AiPlan {
        goal,
        move_to: Some(stand),
        action,
    }
}

fn step_closer(ctx: &AiContext<'_>, aim: Hex) -> Option<Hex> {
    let current = ctx.actor.position.distance(aim);
    ctx.reachable
        .iter()
        .map(|(hex, cost)| (hex.distance(aim), cost, hex))
        .filter(|(distance, _, _)| *distance < current)
        .min()
        .map(|(_, _, hex)| hex)
}

fn position_by_score(ctx: &AiContext<'_>, aim: Hex) -> Option<Hex> {
    let range = ctx.attack_range();
    let score = |hex: Hex| {
        let distance = hex.distance(aim);
        if distance <= range {
            BattleConfig::AI_POSITION_BASE + BattleConfig::AI_IN_RANGE_BONUS
        } else {
            BattleConfig::AI_POSITION_BASE - (distance - range) as i32
        }
    };
    let origin = ctx.actor.position;
    let mut best = (score(origin), origin);
    for (hex, _) in ctx.reachable.iter() {
        let candidate = score(hex);
        tracing::trace!(%hex, candidate, "position score");
        if candidate > best.0 {
            best = (candidate, hex);
        }
    }
    (best.1 != origin).then_some(best.1)
}
