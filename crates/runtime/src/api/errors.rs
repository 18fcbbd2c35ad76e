//! Unified error types surfaced by the runtime API.
//!
//! Wraps battle setup failures, rejected commands and worker coordination
//! failures so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use tactics_core::{CommandError, GameError, SetupError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires a battle session before building")]
    MissingSession,

    #[error("failed to set up the battle")]
    Setup(#[from] SetupError),

    #[error("command rejected: {0}")]
    Rejected(#[from] CommandError),

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("event stream closed before the battle ended")]
    EventStreamClosed,
}

impl RuntimeError {
    /// Stable code for rejected commands, `None` for infrastructure failures.
    pub fn command_code(&self) -> Option<&'static str> {
        match self {
            RuntimeError::Rejected(error) => Some(error.error_code()),
            _ => None,
        }
    }
}
