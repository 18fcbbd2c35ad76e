//! Battle session: the single driver over scheduling, commands and AI.
//!
//! [`BattleSession`] owns the battle. Hosts feed it [`Command`]s while it
//! awaits input and call [`BattleSession::step`] in a loop otherwise. Work
//! that spans several scheduling steps (sub effects, AI move then act, turn
//! end) lives in a FIFO task queue drained one task per step; while the
//! queue is non-empty the session is processing and rejects input.

mod commands;
mod events;
mod setup;
mod snapshot;

pub use commands::Command;
pub use events::{BattleEvent, EventLog, LogLevel};
pub use setup::{
    BattleSetup, SetupError, SpawnParseError, SpawnSpec, deploy, parse_spawn_list,
    unit_from_template,
};
pub use snapshot::{BattleSnapshot, BuffView, UnitView};

use std::collections::VecDeque;

use crate::ai::AiController;
use crate::config::BattleConfig;
use crate::env::{BattleRng, CatalogOracle, HexMap};
use crate::error::{CommandError, GameError};
use crate::hex::Hex;
use crate::resolver::{CastPlan, CombatContext, TurnStart, reachable_for};
use crate::state::{
    BattleReport, BattleState, MemberProgress, PlayerRoster, Team, TurnFlags, UnitId,
};
use crate::status::BuffKind;
use crate::turn::{SchedulerStep, TurnScheduler};

/// What one call to [`BattleSession::step`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepOutcome {
    /// A player-controlled unit holds the turn; send a command.
    AwaitingCommand,
    /// A queued task or turn transition ran.
    Resolved,
    /// Nobody was ready; gauges advanced.
    Advanced { ticks: f64 },
    /// Every living unit is frozen; Stop durations advanced instead.
    Stalled,
    Finished,
}

/// A deferred unit of work.
#[derive(Clone, Debug, PartialEq)]
enum Task {
    Move { unit: UnitId, to: Hex },
    /// AI cast, validated when it runs.
    Cast { unit: UnitId, skill: String, target: Hex },
    Main(CastPlan),
    Sub(CastPlan),
    Commit(CastPlan),
    EndTurn { unit: UnitId },
}

pub struct BattleSession {
    state: BattleState,
    map: HexMap,
    config: BattleConfig,
    rng: BattleRng,
    events: EventLog,
    scheduler: TurnScheduler,
    queue: VecDeque<Task>,
    auto_play: bool,
    seed: u64,
}

impl BattleSession {
    /// Deploys `setup` and opens the battle.
    pub fn start(
        setup: &BattleSetup,
        roster: &PlayerRoster,
        catalog: &dyn CatalogOracle,
        map: HexMap,
        config: BattleConfig,
    ) -> Result<Self, SetupError> {
        let units = deploy(setup, roster, catalog, &map)?;
        let state = BattleState::new(units, setup.stage_cleared);
        Ok(Self::from_state(state, map, config, setup.seed))
    }

    /// Opens a battle over an already populated state.
    pub fn from_state(state: BattleState, map: HexMap, config: BattleConfig, seed: u64) -> Self {
        let mut session = Self {
            scheduler: TurnScheduler::from_config(&config),
            state,
            map,
            config,
            rng: BattleRng::new(seed),
            events: EventLog::new(),
            queue: VecDeque::new(),
            auto_play: false,
            seed,
        };
        session.events.push(BattleEvent::BattleStarted {
            seed,
            units: session.state.units.len(),
        });
        tracing::info!(seed, units = session.state.units.len(), "battle started");
        session.ctx().check_battle_end();
        session
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn map(&self) -> &HexMap {
        &self.map
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn auto_play(&self) -> bool {
        self.auto_play
    }

    pub fn is_finished(&self) -> bool {
        self.state.outcome.is_some()
    }

    /// True while queued work blocks input and AI re-entry.
    pub fn is_processing(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        self.events.drain()
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot::capture(&self.state, self.auto_play)
    }

    /// Hexes the current actor may still move to.
    pub fn movement_options(&self) -> Vec<Hex> {
        let Some(turn) = self.state.turn.as_ref() else {
            return Vec::new();
        };
        if turn.flags.contains(TurnFlags::MOVED) {
            return Vec::new();
        }
        let Some(unit) = self.state.unit(turn.actor) else {
            return Vec::new();
        };
        reachable_for(&self.state, &self.map, unit)
            .iter()
            .map(|(hex, _)| hex)
            .collect()
    }

    /// Final report, once the battle is decided.
    pub fn finish(&self) -> Option<BattleReport> {
        let outcome = self.state.outcome?;
        Some(BattleReport {
            outcome,
            members: self
                .state
                .units
                .iter()
                .filter(|u| u.team == Team::Player)
                .filter_map(MemberProgress::of)
                .collect(),
            loot_gold: self.state.loot_gold,
        })
    }

    fn ctx(&mut self) -> CombatContext<'_> {
        CombatContext {
            state: &mut self.state,
            map: &self.map,
            config: &self.config,
            rolls: &mut self.rng,
            events: &mut self.events,
        }
    }

    /// Whether the player issues commands for `id` this turn. Fear and
    /// confusion take control away from the player.
    fn is_player_controlled(&self, id: UnitId) -> bool {
        !self.auto_play
            && self.state.unit(id).is_some_and(|unit| {
                unit.team == Team::Player
                    && !unit.has(BuffKind::Fear)
                    && !unit.has(BuffKind::Confuse)
            })
    }

    /// Advances the battle by one task, turn transition or gauge step.
    pub fn step(&mut self) -> StepOutcome {
        if self.state.outcome.is_some() {
            self.queue.clear();
            return StepOutcome::Finished;
        }

        if let Some(task) = self.queue.pop_front() {
            self.run(task);
            self.settle();
            return StepOutcome::Resolved;
        }

        if let Some(actor) = self.state.current_actor() {
            if self.is_player_controlled(actor) {
                return StepOutcome::AwaitingCommand;
            }
            self.plan_ai_turn(actor);
            return self.step();
        }

        match self.scheduler.next(&mut self.state.units) {
            SchedulerStep::Ready(id) => {
                self.open_turn(id);
                StepOutcome::Resolved
            }
            SchedulerStep::Advanced { ticks } => {
                self.events.push(BattleEvent::GaugeAdvanced { ticks });
                StepOutcome::Advanced { ticks }
            }
            SchedulerStep::Stalled => {
                self.thaw();
                StepOutcome::Stalled
            }
        }
    }

    fn open_turn(&mut self, id: UnitId) {
        let mut ctx = self.ctx();
        match ctx.begin_turn(id) {
            TurnStart::Act => {}
            TurnStart::Skipped(_) => ctx.skip_turn(id),
            TurnStart::Died => {
                // A revive keeps the unit standing; its turn is still spent.
                if ctx.state.unit(id).is_some_and(|u| u.is_alive()) {
                    ctx.skip_turn(id);
                }
            }
        }
    }

    /// Advances Stop on every living unit when all of them are frozen.
    fn thaw(&mut self) {
        tracing::debug!("all gauges frozen; advancing stop");
        for unit in self.state.units.iter_mut().filter(|u| u.is_alive()) {
            if unit.buffs.advance_stop() {
                self.events.push(BattleEvent::BuffExpired {
                    target: unit.id,
                    buff: BuffKind::Stop,
                });
            }
        }
    }

    fn plan_ai_turn(&mut self, actor: UnitId) {
        let plan = AiController::new(&self.state, &self.map, &self.config).plan(
            actor,
            self.auto_play,
            &mut self.rng,
        );
        let flags = self
            .state
            .turn
            .as_ref()
            .map(|turn| turn.flags)
            .unwrap_or_default();

        if let Some(to) = plan.move_to.filter(|_| !flags.contains(TurnFlags::MOVED)) {
            self.queue.push_back(Task::Move { unit: actor, to });
        }
        if let Some(action) = plan.action.filter(|_| !flags.contains(TurnFlags::ACTED)) {
            self.queue.push_back(Task::Cast {
                unit: actor,
                skill: action.skill,
                target: action.target,
            });
        }
        self.queue.push_back(Task::EndTurn { unit: actor });
    }

    fn run(&mut self, task: Task) {
        tracing::trace!(?task, "running task");
        match task {
            Task::Move { unit, to } => {
                let moved = self.ctx().move_unit(unit, to);
                if let Err(error) = moved {
                    self.events
                        .warn(format!("{unit} could not move to {to}: {error}"));
                }
            }
            Task::Cast {
                unit,
                skill,
                target,
            } => {
                let planned = self.ctx().plan_cast(unit, &skill, target);
                match planned {
                    Ok(plan) => {
                        self.queue.push_front(Task::Commit(plan.clone()));
                        if plan.has_sub() {
                            self.queue.push_front(Task::Sub(plan.clone()));
                        }
                        self.ctx().perform_main(&plan);
                    }
                    Err(error) => {
                        self.events
                            .warn(format!("{unit} could not use `{skill}`: {error}"));
                    }
                }
            }
            Task::Main(plan) => self.ctx().perform_main(&plan),
            Task::Sub(plan) => self.ctx().apply_sub(&plan),
            Task::Commit(plan) => self.ctx().commit_cast(&plan),
            Task::EndTurn { unit } => {
                self.queue.retain(|task| !matches!(task, Task::EndTurn { unit: u } if *u == unit));
                self.ctx().end_turn(unit);
            }
        }
    }

    /// Post-task bookkeeping: battle end, dead actors, automatic turn end.
    fn settle(&mut self) {
        self.ctx().check_battle_end();
        if self.state.outcome.is_some() {
            self.queue.clear();
            return;
        }
        let Some(turn) = self.state.turn.as_ref() else {
            return;
        };
        let actor = turn.actor;
        let complete = turn.is_complete();
        if !self.state.unit(actor).is_some_and(|u| u.is_alive()) {
            self.state.turn = None;
            self.queue.clear();
            return;
        }
        if complete && self.queue.is_empty() {
            self.queue.push_back(Task::EndTurn { unit: actor });
        }
    }

    /// Records `error` as a rejection event and hands it back.
    fn reject(&mut self, error: CommandError) -> CommandError {
        self.events.push(BattleEvent::CommandRejected {
            code: error.error_code().to_string(),
            reason: error.to_string(),
        });
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::TerrainCosts;
    use crate::state::Unit;
    use crate::stats::Attributes;
    use crate::status::Buff;

    pub(super) fn session(units: Vec<Unit>) -> BattleSession {
        let map = HexMap::hexagon(5, TerrainCosts::new());
        BattleSession::from_state(
            BattleState::new(units, false),
            map,
            BattleConfig::default(),
            7,
        )
    }

    pub(super) fn fighter(id: u32, team: Team, at: Hex) -> Unit {
        Unit::new(UnitId(id), format!("u{id}"), team, Attributes::uniform(10)).at(at)
    }

    /// Steps until a command is needed or the battle ends.
    pub(super) fn run_until_input(session: &mut BattleSession) -> StepOutcome {
        for _ in 0..10_000 {
            match session.step() {
                outcome @ (StepOutcome::AwaitingCommand | StepOutcome::Finished) => {
                    return outcome;
                }
                _ => {}
            }
        }
        panic!("battle did not settle");
    }

    #[test]
    fn player_gets_the_turn() {
        let mut player = fighter(0, Team::Player, Hex::new(-3, 0));
        player.gauge = 100.0;
        let mut session = session(vec![player, fighter(1, Team::Enemy, Hex::new(3, 0))]);
        assert_eq!(session.step(), StepOutcome::Resolved);
        assert_eq!(session.step(), StepOutcome::AwaitingCommand);
        assert_eq!(session.state().current_actor(), Some(UnitId(0)));
        assert!(!session.movement_options().is_empty());
    }

    #[test]
    fn enemy_turn_runs_as_queued_tasks() {
        let mut enemy = fighter(1, Team::Enemy, Hex::new(2, 0));
        enemy.gauge = 100.0;
        let mut session = session(vec![fighter(0, Team::Player, Hex::ORIGIN), enemy]);
        session.step();
        assert_eq!(session.state().current_actor(), Some(UnitId(1)));

        // Plan, then move and cast run one task per step.
        assert_eq!(session.step(), StepOutcome::Resolved);
        assert!(session.is_processing());
        while session.state().current_actor() == Some(UnitId(1)) {
            session.step();
        }
        let events = session.drain_events();
        assert!(events.iter().any(|e| matches!(e, BattleEvent::UnitMoved { unit: UnitId(1), .. })));
        assert!(events.iter().any(|e| matches!(e, BattleEvent::SkillUsed { unit: UnitId(1), .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            BattleEvent::TurnEnded { unit: UnitId(1), gauge_cost } if *gauge_cost == 100.0
        )));
    }

    #[test]
    fn feared_player_unit_is_not_controllable() {
        let mut player = fighter(0, Team::Player, Hex::ORIGIN);
        player.gauge = 100.0;
        player.buffs.apply(Buff::new(BuffKind::Fear, 3, 0.0));
        let mut session = session(vec![player, fighter(1, Team::Enemy, Hex::new(1, 0))]);
        session.step();
        assert_ne!(session.step(), StepOutcome::AwaitingCommand);
        let events = session.drain_events();
        assert!(events.iter().any(|e| matches!(e, BattleEvent::UnitMoved { unit: UnitId(0), .. })));
    }

    #[test]
    fn frozen_field_stalls_then_thaws() {
        let mut a = fighter(0, Team::Player, Hex::ORIGIN);
        let mut b = fighter(1, Team::Enemy, Hex::new(3, 0));
        a.buffs.apply(Buff::new(BuffKind::Stop, 1, 0.0));
        b.buffs.apply(Buff::new(BuffKind::Stop, 1, 0.0));
        let mut session = session(vec![a, b]);
        assert_eq!(session.step(), StepOutcome::Stalled);
        assert!(session.state().units.iter().all(|u| !u.has(BuffKind::Stop)));
        assert!(matches!(session.step(), StepOutcome::Advanced { .. }));
    }

    #[test]
    fn auto_played_battle_finishes_with_report() {
        let mut roster_unit = fighter(0, Team::Player, Hex::new(-1, 0));
        roster_unit.roster_id = Some(crate::state::RosterId(0));
        let mut weakling = Unit::new(UnitId(1), "weakling", Team::Enemy, Attributes::uniform(1))
            .at(Hex::new(1, 0));
        weakling.hp = 1;
        let mut session = session(vec![roster_unit, weakling]);
        assert!(session.apply(Command::ToggleAutoPlay).is_ok());
        assert_eq!(run_until_input(&mut session), StepOutcome::Finished);

        let report = session.finish().expect("battle decided");
        assert_eq!(report.outcome, crate::state::BattleOutcome::Victory);
        assert_eq!(report.members.len(), 1);
        assert!(report.members[0].xp > 0);
        assert_eq!(session.step(), StepOutcome::Finished);
    }
}
