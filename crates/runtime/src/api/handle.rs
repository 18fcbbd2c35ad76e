//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! commanding the battle or streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use tactics_core::{BattleReport, BattleSnapshot, Command};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, SessionEvent, Topic};
use crate::workers::Request;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    request_tx: mpsc::Sender<Request>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(request_tx: mpsc::Sender<Request>, event_bus: EventBus) -> Self {
        Self {
            request_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Request) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.request_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Submit a player command.
    ///
    /// Commands only land while a player-controlled unit awaits input;
    /// anything else comes back as [`RuntimeError::Rejected`].
    pub async fn apply(&self, command: Command) -> Result<()> {
        self.request(|reply| Request::Apply { command, reply })
            .await?
    }

    /// Query the current battle (read-only snapshot)
    pub async fn snapshot(&self) -> Result<BattleSnapshot> {
        self.request(|reply| Request::Snapshot { reply }).await
    }

    /// Final report once the battle is decided.
    pub async fn report(&self) -> Result<Option<BattleReport>> {
        self.request(|reply| Request::Report { reply }).await
    }

    /// Waits until the battle is decided and returns its report.
    pub async fn wait_finished(&self) -> Result<BattleReport> {
        // Subscribe before asking so the event cannot slip in between.
        let mut session_rx = self.subscribe(Topic::Session);
        if let Some(report) = self.report().await? {
            return Ok(report);
        }
        loop {
            match session_rx.recv().await {
                Ok(Event::Session(SessionEvent::BattleFinished { report })) => return Ok(report),
                Ok(Event::Session(SessionEvent::WorkerStopped)) => {
                    return Err(RuntimeError::EventStreamClosed);
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "session stream lagged");
                    if let Some(report) = self.report().await? {
                        return Ok(report);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(RuntimeError::EventStreamClosed);
                }
            }
        }
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Battle` - Everything the battle core emits
    /// - `Topic::Session` - Worker lifecycle and input prompts
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use tactics_runtime::Topic;
    ///
    /// let mut battle_rx = handle.subscribe(Topic::Battle);
    /// while let Ok(event) = battle_rx.recv().await {
    ///     // Render the event
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub(crate) async fn request_shutdown(&self) {
        if self.request_tx.send(Request::Shutdown).await.is_err() {
            tracing::debug!("worker already stopped");
        }
    }
}
