//! Simulation worker that owns the authoritative [`BattleSession`].
//!
//! Receives requests from [`RuntimeHandle`](crate::RuntimeHandle), steps the
//! session and publishes everything it emits to the [`EventBus`].

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use tactics_core::{BattleReport, BattleSession, BattleSnapshot, Command, StepOutcome};

use crate::api::Result;
use crate::events::{Event, EventBus, SessionEvent};

/// Requests that can be sent to the simulation worker
pub enum Request {
    /// Apply a player command to the current turn.
    Apply {
        command: Command,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Read-only view of the battle.
    Snapshot {
        reply: oneshot::Sender<BattleSnapshot>,
    },
    /// Final report, `None` while the battle is undecided.
    Report {
        reply: oneshot::Sender<Option<BattleReport>>,
    },
    Shutdown,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Background task that drives one battle to its end.
pub struct SimulationWorker {
    session: BattleSession,
    request_rx: mpsc::Receiver<Request>,
    event_bus: EventBus,
    pacing: Option<Duration>,
}

impl SimulationWorker {
    pub fn new(
        session: BattleSession,
        request_rx: mpsc::Receiver<Request>,
        event_bus: EventBus,
        pacing: Option<Duration>,
    ) -> Self {
        info!(
            seed = session.seed(),
            units = session.state().units.len(),
            "SimulationWorker initialized"
        );

        Self {
            session,
            request_rx,
            event_bus,
            pacing,
        }
    }

    /// Main worker loop. Returns the battle report, if the battle was
    /// decided before the worker stopped.
    pub async fn run(mut self) -> Option<BattleReport> {
        self.event_bus
            .publish(Event::Session(SessionEvent::WorkerStarted {
                seed: self.session.seed(),
            }));
        self.publish_battle_events();

        let mut prompted = false;
        loop {
            while let Ok(request) = self.request_rx.try_recv() {
                if self.handle_request(request) == Flow::Stop {
                    return self.stop();
                }
            }

            let outcome = self.session.step();
            self.publish_battle_events();

            match outcome {
                StepOutcome::AwaitingCommand => {
                    if !prompted {
                        prompted = true;
                        if let Some(actor) = self.session.state().current_actor() {
                            self.event_bus
                                .publish(Event::Session(SessionEvent::AwaitingCommand { actor }));
                        }
                    }
                    let Some(request) = self.request_rx.recv().await else {
                        return self.stop();
                    };
                    if self.handle_request(request) == Flow::Stop {
                        return self.stop();
                    }
                }
                StepOutcome::Resolved => {
                    prompted = false;
                    match self.pacing {
                        Some(delay) => tokio::time::sleep(delay).await,
                        None => tokio::task::yield_now().await,
                    }
                }
                StepOutcome::Advanced { .. } | StepOutcome::Stalled => {
                    prompted = false;
                    tokio::task::yield_now().await;
                }
                StepOutcome::Finished => {
                    if let Some(report) = self.session.finish() {
                        info!(outcome = %report.outcome, "battle finished");
                        self.event_bus
                            .publish(Event::Session(SessionEvent::BattleFinished { report }));
                    }
                    return self.serve_until_shutdown().await;
                }
            }
        }
    }

    /// Keeps answering queries once the battle is over.
    async fn serve_until_shutdown(mut self) -> Option<BattleReport> {
        while let Some(request) = self.request_rx.recv().await {
            if self.handle_request(request) == Flow::Stop {
                break;
            }
        }
        self.stop()
    }

    fn stop(self) -> Option<BattleReport> {
        info!("SimulationWorker stopped");
        self.event_bus
            .publish(Event::Session(SessionEvent::WorkerStopped));
        self.session.finish()
    }

    fn handle_request(&mut self, request: Request) -> Flow {
        match request {
            Request::Apply { command, reply } => {
                let result = self.session.apply(command).map_err(Into::into);
                self.publish_battle_events();
                if reply.send(result).is_err() {
                    debug!("Apply reply channel closed (caller dropped)");
                }
            }
            Request::Snapshot { reply } => {
                if reply.send(self.session.snapshot()).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
            Request::Report { reply } => {
                if reply.send(self.session.finish()).is_err() {
                    debug!("Report reply channel closed (caller dropped)");
                }
            }
            Request::Shutdown => return Flow::Stop,
        }
        Flow::Continue
    }

    fn publish_battle_events(&mut self) {
        for event in self.session.drain_events() {
            self.event_bus.publish(Event::Battle(event));
        }
    }
}
