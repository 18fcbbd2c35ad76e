//! Deterministic rules for turn-based tactical hex combat.
//!
//! `tactics-core` owns the canonical battle rules (hex geometry, stats,
//! statuses, turn scheduling, combat resolution and AI) and exposes them as
//! pure APIs. All battle mutation flows through [`engine::BattleSession`];
//! the content loader, runtime and CLI crates depend on the types
//! re-exported here.
pub mod ai;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod hex;
pub mod resolver;
pub mod skill;
pub mod state;
pub mod stats;
pub mod status;
pub mod turn;

pub use ai::{AiController, AiPlan, Goal, PlannedAction};
pub use combat::{AttackProfile, DamageCategory, DamageOutcome, Element, FacingRelation};
pub use config::BattleConfig;
pub use engine::{
    BattleEvent, BattleSession, BattleSetup, BattleSnapshot, Command, LogLevel, SetupError,
    SpawnParseError, SpawnSpec, StepOutcome, UnitView, parse_spawn_list,
};
pub use env::{
    BattleRng, CatalogOracle, HexMap, MapOracle, RollSource, StaticCatalog, TerrainCosts,
    TerrainKind, UnitTemplate,
};
pub use error::{CommandError, ErrorSeverity, GameError};
pub use hex::{Direction, Hex};
pub use skill::{Effect, EffectKind, Skill, TargetMode};
pub use state::{
    BattleOutcome, BattleReport, BattleState, EquipSlot, EquipmentItem, Passive, PassiveKind,
    PlayerRoster, RosterId, Team, Trap, TrapKind, Unit, UnitId,
};
pub use stats::{Attributes, CombatStats, StatKind};
pub use status::{Buff, BuffKind, BuffList};
pub use turn::{SchedulerStep, TurnScheduler};
