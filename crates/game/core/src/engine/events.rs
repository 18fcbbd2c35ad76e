//! Outbound battle events.
//!
//! The core never talks to a renderer; everything observable is pushed here
//! and drained by the host.

use crate::combat::FacingRelation;
use crate::hex::{Direction, Hex};
use crate::state::{BattleOutcome, TrapKind, UnitId};
use crate::status::BuffKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogLevel {
    Info,
    Warn,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "event")
)]
pub enum BattleEvent {
    BattleStarted {
        seed: u64,
        units: usize,
    },
    GaugeAdvanced {
        ticks: f64,
    },
    TurnStarted {
        unit: UnitId,
    },
    TurnSkipped {
        unit: UnitId,
        cause: BuffKind,
    },
    TurnEnded {
        unit: UnitId,
        gauge_cost: f64,
    },
    AutoPlayToggled {
        enabled: bool,
    },
    SkillSelected {
        unit: UnitId,
        skill: String,
    },
    SelectionCleared {
        unit: UnitId,
    },
    UnitMoved {
        unit: UnitId,
        from: Hex,
        to: Hex,
        facing: Direction,
    },
    SkillUsed {
        unit: UnitId,
        skill: String,
        target: Hex,
    },
    Damaged {
        source: Option<UnitId>,
        target: UnitId,
        amount: i32,
        critical: bool,
        facing: FacingRelation,
        hp_after: i32,
    },
    Missed {
        source: UnitId,
        target: UnitId,
    },
    Immune {
        target: UnitId,
    },
    ShieldAbsorbed {
        target: UnitId,
        amount: i32,
    },
    Healed {
        target: UnitId,
        amount: i32,
        hp_after: i32,
    },
    MpChanged {
        target: UnitId,
        delta: i32,
        mp_after: i32,
    },
    GaugeChanged {
        unit: UnitId,
        gauge: f64,
    },
    BuffApplied {
        target: UnitId,
        buff: BuffKind,
        duration: u32,
        refreshed: bool,
    },
    BuffResisted {
        target: UnitId,
        buff: BuffKind,
        chance: Option<f64>,
    },
    BuffTicked {
        target: UnitId,
        buff: BuffKind,
        damage: i32,
        heal: i32,
    },
    BuffExpired {
        target: UnitId,
        buff: BuffKind,
    },
    BuffRemoved {
        target: UnitId,
        buff: BuffKind,
    },
    Displaced {
        unit: UnitId,
        from: Hex,
        to: Hex,
    },
    CooldownsReset {
        unit: UnitId,
    },
    GoldStolen {
        from: UnitId,
        amount: u32,
    },
    TrapPlaced {
        position: Hex,
        kind: TrapKind,
        owner: UnitId,
    },
    TrapTriggered {
        position: Hex,
        kind: TrapKind,
        unit: UnitId,
    },
    UnitRevived {
        unit: UnitId,
        hp: i32,
    },
    UnitDied {
        unit: UnitId,
        killer: Option<UnitId>,
    },
    ExperienceGained {
        unit: UnitId,
        amount: u32,
    },
    LevelUp {
        unit: UnitId,
        level: u32,
    },
    CommandRejected {
        code: String,
        reason: String,
    },
    Log {
        level: LogLevel,
        message: String,
    },
    BattleEnded {
        outcome: BattleOutcome,
    },
}

/// Event buffer mirrored into `tracing`.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<BattleEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: BattleEvent) {
        match &event {
            BattleEvent::Log {
                level: LogLevel::Warn,
                message,
            } => tracing::warn!(%message, "battle diagnostic"),
            BattleEvent::CommandRejected { code, reason } => {
                tracing::debug!(%code, %reason, "command rejected")
            }
            other => tracing::trace!(event = ?other, "battle event"),
        }
        self.events.push(event);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(BattleEvent::Log {
            level: LogLevel::Warn,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(BattleEvent::Log {
            level: LogLevel::Info,
            message: message.into(),
        });
    }

    pub fn drain(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
