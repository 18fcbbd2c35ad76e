//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up request/event channels,
//! and exposes a builder-based API for clients to drive a battle.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use tactics_core::{BattleReport, BattleSession, Command, PlayerRoster};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Request, SimulationWorker};

/// Runtime configuration shared across the orchestrator and worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Delay after each resolved task; `None` runs as fast as possible.
    pub pacing: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 1024,
            command_buffer_size: 32,
            pacing: None,
        }
    }
}

/// What is left once the runtime has shut down.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSummary {
    /// `None` if the worker stopped before the battle was decided.
    pub report: Option<BattleReport>,
    /// The roster handed to the builder, with the report committed.
    pub roster: Option<PlayerRoster>,
}

/// Main runtime that orchestrates one battle
///
/// Runtime owns the worker task; [`RuntimeHandle`] provides a cloneable
/// façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    roster: Option<PlayerRoster>,
    sim_worker_handle: JoinHandle<Option<BattleReport>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to battle events
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.handle.subscribe(Topic::Battle)
    }

    /// Waits for the battle to end, then shuts the worker down.
    pub async fn run_to_end(self) -> Result<RuntimeSummary> {
        self.handle.wait_finished().await?;
        self.shutdown().await
    }

    /// Shutdown the runtime gracefully
    ///
    /// A decided battle is committed to the roster given to the builder.
    pub async fn shutdown(self) -> Result<RuntimeSummary> {
        self.handle.request_shutdown().await;
        drop(self.handle);

        let report = self
            .sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        let mut roster = self.roster;
        if let (Some(roster), Some(report)) = (roster.as_mut(), report.as_ref()) {
            roster.commit(report);
        }
        Ok(RuntimeSummary { report, roster })
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    session: Option<BattleSession>,
    roster: Option<PlayerRoster>,
    event_bus: Option<EventBus>,
    auto_play: bool,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            session: None,
            roster: None,
            event_bus: None,
            auto_play: false,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the battle to run (required)
    pub fn session(mut self, session: BattleSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Roster the battle was set up from; results are committed to it on
    /// shutdown.
    pub fn roster(mut self, roster: PlayerRoster) -> Self {
        self.roster = Some(roster);
        self
    }

    /// Use an existing bus, e.g. one already subscribed to so that no early
    /// event is missed.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Let the AI play the player's side as well.
    pub fn auto_play(mut self, enabled: bool) -> Self {
        self.auto_play = enabled;
        self
    }

    /// Build the runtime and spawn its worker
    pub async fn build(self) -> Result<Runtime> {
        let mut session = self.session.ok_or(RuntimeError::MissingSession)?;
        if session.auto_play() != self.auto_play {
            session.apply(Command::ToggleAutoPlay)?;
        }

        let (request_tx, request_rx) =
            mpsc::channel::<Request>(self.config.command_buffer_size.max(1));
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| EventBus::with_capacity(self.config.event_buffer_size));

        let handle = RuntimeHandle::new(request_tx, event_bus.clone());

        let sim_worker = SimulationWorker::new(session, request_rx, event_bus, self.config.pacing);
        let sim_worker_handle = tokio::spawn(sim_worker.run());

        Ok(Runtime {
            handle,
            roster: self.roster,
            sim_worker_handle,
        })
    }
}
