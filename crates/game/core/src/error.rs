//! Common error infrastructure for tactics-core.
//!
//! Illegal commands are rejected with a [`CommandError`]; the session also
//! records every rejection as an event, so a host that ignores the `Result`
//! still sees why nothing happened. Setup and parsing errors live next to the
//! code that produces them.

use crate::hex::Hex;
use crate::state::UnitId;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Retry may succeed later or with a different choice (target out of
    /// range, not enough MP).
    Recoverable,

    /// Invalid input that should not be retried unchanged.
    Validation,

    /// Unexpected state inconsistency.
    Internal,

    /// The battle cannot continue.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for tactics-core errors.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for the variant, used in events and logs.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Why a command was refused.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("the battle is over")]
    BattleOver,

    #[error("a turn is still resolving")]
    Busy,

    #[error("no unit is waiting for a command")]
    NoActiveTurn,

    #[error("{0} is not under player control")]
    NotPlayerControlled(UnitId),

    #[error("unit {0} not found")]
    UnitNotFound(UnitId),

    #[error("unknown skill `{0}`")]
    UnknownSkill(String),

    #[error("skill `{skill}` requires level {tier}")]
    TierLocked { skill: String, tier: u32 },

    #[error("not enough MP: need {needed}, have {available}")]
    InsufficientMp { needed: u32, available: i32 },

    #[error("gauge {gauge:.0} cannot pay cost {cost:.0}")]
    InsufficientGauge { cost: f64, gauge: f64 },

    #[error("skill `{skill}` is on cooldown for {turns} more turn(s)")]
    OnCooldown { skill: String, turns: u32 },

    #[error("target at distance {distance} is beyond range {range}")]
    OutOfRange { distance: u32, range: u32 },

    #[error("silenced units cannot cast skills")]
    Silenced,

    #[error("crowd-controlled units cannot act")]
    Incapacitated,

    #[error("already moved this turn")]
    AlreadyMoved,

    #[error("already acted this turn")]
    AlreadyActed,

    #[error("rooted units cannot move")]
    Rooted,

    #[error("hex {0} is not reachable")]
    Unreachable(Hex),

    #[error("no valid target at {0}")]
    InvalidTarget(Hex),

    #[error("cannot close in on the target at {0}")]
    DashBlocked(Hex),
}

impl GameError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::BattleOver => ErrorSeverity::Fatal,
            Self::UnitNotFound(_) => ErrorSeverity::Internal,
            Self::Busy
            | Self::InsufficientMp { .. }
            | Self::InsufficientGauge { .. }
            | Self::OnCooldown { .. }
            | Self::OutOfRange { .. }
            | Self::Silenced
            | Self::Incapacitated
            | Self::Rooted
            | Self::DashBlocked(_) => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BattleOver => "BATTLE_OVER",
            Self::Busy => "BUSY",
            Self::NoActiveTurn => "NO_ACTIVE_TURN",
            Self::NotPlayerControlled(_) => "NOT_PLAYER_CONTROLLED",
            Self::UnitNotFound(_) => "UNIT_NOT_FOUND",
            Self::UnknownSkill(_) => "UNKNOWN_SKILL",
            Self::TierLocked { .. } => "TIER_LOCKED",
            Self::InsufficientMp { .. } => "INSUFFICIENT_MP",
            Self::InsufficientGauge { .. } => "INSUFFICIENT_GAUGE",
            Self::OnCooldown { .. } => "ON_COOLDOWN",
            Self::OutOfRange { .. } => "OUT_OF_RANGE",
            Self::Silenced => "SILENCED",
            Self::Incapacitated => "INCAPACITATED",
            Self::AlreadyMoved => "ALREADY_MOVED",
            Self::AlreadyActed => "ALREADY_ACTED",
            Self::Rooted => "ROOTED",
            Self::Unreachable(_) => "UNREACHABLE",
            Self::InvalidTarget(_) => "INVALID_TARGET",
            Self::DashBlocked(_) => "DASH_BLOCKED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_severity() {
        let err = CommandError::OutOfRange { distance: 4, range: 2 };
        assert_eq!(err.error_code(), "OUT_OF_RANGE");
        assert!(err.severity().is_recoverable());
        assert_eq!(err.to_string(), "target at distance 4 is beyond range 2");
        assert!(CommandError::UnitNotFound(UnitId(3)).severity().is_internal());
    }
}
