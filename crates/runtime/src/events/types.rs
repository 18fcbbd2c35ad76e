//! Session lifecycle events published by the simulation worker.

use serde::{Deserialize, Serialize};

use tactics_core::{BattleReport, UnitId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "session")]
pub enum SessionEvent {
    /// The worker owns the session and begins stepping it.
    WorkerStarted { seed: u64 },
    /// A player-controlled unit is waiting for a command.
    AwaitingCommand { actor: UnitId },
    BattleFinished { report: BattleReport },
    /// The worker has stopped; no further events follow.
    WorkerStopped,
}
