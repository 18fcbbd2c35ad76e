//! Player command surface.

use super::{BattleEvent, BattleSession, Task};
use crate::error::CommandError;
use crate::hex::Hex;
use crate::skill::Skill;
use crate::state::{TurnFlags, UnitId};

/// Input accepted while the session awaits a command.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "command", rename_all = "snake_case")
)]
pub enum Command {
    /// Arms a skill for the next [`Command::Act`].
    SelectSkill { skill: String },
    CancelSelection,
    Move { to: Hex },
    /// Uses the selected skill, or the basic attack, on `target`.
    Act { target: Hex },
    UseSkill { skill: String, target: Hex },
    EndTurn,
    ToggleAutoPlay,
}

impl BattleSession {
    /// Applies `command` for the current actor. Rejections change nothing
    /// and are reported both as the error and as a `CommandRejected` event.
    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        tracing::debug!(?command, "command received");
        self.dispatch(command).map_err(|error| self.reject(error))
    }

    fn dispatch(&mut self, command: Command) -> Result<(), CommandError> {
        if self.state.outcome.is_some() {
            return Err(CommandError::BattleOver);
        }
        if let Command::ToggleAutoPlay = command {
            self.auto_play = !self.auto_play;
            self.events.push(BattleEvent::AutoPlayToggled {
                enabled: self.auto_play,
            });
            return Ok(());
        }

        let actor = self.controlled_actor()?;
        match command {
            Command::SelectSkill { skill } => self.select(actor, skill),
            Command::CancelSelection => {
                if let Some(turn) = self.state.turn.as_mut() {
                    turn.selected = None;
                }
                self.events
                    .push(BattleEvent::SelectionCleared { unit: actor });
                Ok(())
            }
            Command::Move { to } => {
                self.ctx().move_unit(actor, to)?;
                self.settle();
                Ok(())
            }
            Command::Act { target } => {
                let skill = self
                    .state
                    .turn
                    .as_ref()
                    .and_then(|turn| turn.selected.clone())
                    .unwrap_or_else(|| Skill::BASIC_ATTACK.to_string());
                self.queue_cast(actor, &skill, target)
            }
            Command::UseSkill { skill, target } => self.queue_cast(actor, &skill, target),
            Command::EndTurn => {
                self.queue.push_back(Task::EndTurn { unit: actor });
                Ok(())
            }
            Command::ToggleAutoPlay => Ok(()),
        }
    }

    /// The unit the player may command right now.
    fn controlled_actor(&self) -> Result<UnitId, CommandError> {
        if self.is_processing() {
            return Err(CommandError::Busy);
        }
        let actor = self
            .state
            .current_actor()
            .ok_or(CommandError::NoActiveTurn)?;
        if !self.is_player_controlled(actor) {
            return Err(CommandError::NotPlayerControlled(actor));
        }
        Ok(actor)
    }

    fn select(&mut self, actor: UnitId, skill_id: String) -> Result<(), CommandError> {
        let unit = self
            .state
            .unit(actor)
            .ok_or(CommandError::UnitNotFound(actor))?;
        let skill = unit
            .skill(&skill_id)
            .ok_or_else(|| CommandError::UnknownSkill(skill_id.clone()))?;
        unit.check_usable(&skill)?;
        let turn = self.state.turn.as_mut().ok_or(CommandError::NoActiveTurn)?;
        if turn.flags.contains(TurnFlags::ACTED) {
            return Err(CommandError::AlreadyActed);
        }
        turn.selected = Some(skill_id.clone());
        self.events.push(BattleEvent::SkillSelected {
            unit: actor,
            skill: skill_id,
        });
        Ok(())
    }

    /// Validates now; the main effect, sub effect and commit resolve on the
    /// following steps.
    fn queue_cast(&mut self, actor: UnitId, skill: &str, target: Hex) -> Result<(), CommandError> {
        let plan = self.ctx().plan_cast(actor, skill, target)?;
        let has_sub = plan.has_sub();
        self.queue.push_back(Task::Main(plan.clone()));
        if has_sub {
            self.queue.push_back(Task::Sub(plan.clone()));
        }
        self.queue.push_back(Task::Commit(plan));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::StepOutcome;
    use super::super::tests::{fighter, run_until_input, session};
    use super::*;
    use crate::skill::{Effect, EffectKind, TargetMode};
    use crate::state::Team;
    use crate::status::BuffKind;

    fn opened() -> BattleSession {
        let burn = Skill::new(
            "ember",
            Effect::new(EffectKind::Damage, TargetMode::SingleEnemy, 1.0),
        )
        .with_costs(5, 100.0)
        .with_range(3)
        .with_sub(
            Effect::new(EffectKind::Status { buff: BuffKind::Burn }, TargetMode::SingleEnemy, 2.0)
                .with_duration(2)
                .with_chance(100.0),
        );
        let mut player = fighter(0, Team::Player, Hex::ORIGIN).with_skill(burn);
        player.gauge = 100.0;
        let mut session = session(vec![player, fighter(1, Team::Enemy, Hex::new(2, 0))]);
        assert_eq!(run_until_input(&mut session), StepOutcome::AwaitingCommand);
        session.drain_events();
        session
    }

    #[test]
    fn act_uses_selection_and_resolves_over_steps() {
        let mut session = opened();
        session
            .apply(Command::SelectSkill {
                skill: "ember".into(),
            })
            .expect("select");
        session
            .apply(Command::Act {
                target: Hex::new(2, 0),
            })
            .expect("act");

        assert!(session.is_processing());
        assert_eq!(
            session.apply(Command::EndTurn),
            Err(CommandError::Busy)
        );

        // Main effect, then sub effect, then commit.
        assert_eq!(session.step(), StepOutcome::Resolved);
        let enemy = session.state().unit(UnitId(1)).expect("enemy");
        assert!(!enemy.has(BuffKind::Burn));
        assert_eq!(session.step(), StepOutcome::Resolved);
        let enemy = session.state().unit(UnitId(1)).expect("enemy");
        assert!(enemy.has(BuffKind::Burn));
        assert_eq!(session.step(), StepOutcome::Resolved);
        let turn = session.state().turn.as_ref().expect("still the player's turn");
        assert!(turn.flags.contains(TurnFlags::ACTED));
        assert_eq!(turn.selected, None);

        assert_eq!(session.step(), StepOutcome::AwaitingCommand);
    }

    #[test]
    fn dash_attack_closes_the_turn() {
        let mut session = opened();
        session
            .apply(Command::Act {
                target: Hex::new(2, 0),
            })
            .expect("dash attack");
        while session.is_processing() {
            session.step();
        }
        // The dash already spent the move; the turn closes by itself.
        assert_eq!(session.state().current_actor(), None);
        let events = session.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, BattleEvent::TurnEnded { unit: UnitId(0), .. })));
    }

    #[test]
    fn rejections_leave_state_alone_and_are_logged() {
        let mut session = opened();
        let before = session.snapshot();
        assert_eq!(
            session.apply(Command::UseSkill {
                skill: "ember".into(),
                target: Hex::new(1, 1),
            }),
            Err(CommandError::InvalidTarget(Hex::new(1, 1)))
        );
        assert_eq!(
            session.apply(Command::Move {
                to: Hex::new(9, 9)
            }),
            Err(CommandError::Unreachable(Hex::new(9, 9)))
        );
        assert_eq!(session.snapshot(), before);
        let codes: Vec<String> = session
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                BattleEvent::CommandRejected { code, .. } => Some(code),
                _ => None,
            })
            .collect();
        assert_eq!(codes, vec!["INVALID_TARGET", "UNREACHABLE"]);
    }

    #[test]
    fn end_turn_and_auto_play() {
        let mut session = opened();
        session.apply(Command::EndTurn).expect("end turn");
        session.step();
        assert_eq!(session.state().current_actor(), None);
        assert_eq!(
            session.apply(Command::CancelSelection),
            Err(CommandError::NoActiveTurn)
        );
        session.apply(Command::ToggleAutoPlay).expect("toggle");
        assert!(session.auto_play());
    }
}
