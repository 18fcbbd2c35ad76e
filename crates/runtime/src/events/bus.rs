//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;

use tactics_core::BattleEvent;

use super::types::SessionEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Everything the battle core emits
    Battle,
    /// Worker lifecycle and input prompts
    Session,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Battle(BattleEvent),
    Session(SessionEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Battle(_) => Topic::Battle,
            Event::Session(_) => Topic::Session,
        }
    }
}

/// Topic-based event bus
///
/// Senders are created up front, so publishing and subscribing never block.
/// Slow subscribers lag rather than stall the worker.
#[derive(Clone)]
pub struct EventBus {
    battle: broadcast::Sender<Event>,
    session: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            battle: broadcast::channel(capacity).0,
            session: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Battle => &self.battle,
            Topic::Session => &self.session,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::UnitId;

    #[tokio::test]
    async fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut receivers = bus.subscribe_multiple(&[Topic::Battle, Topic::Session]);

        bus.publish(Event::Battle(BattleEvent::TurnStarted { unit: UnitId(3) }));
        bus.publish(Event::Session(SessionEvent::WorkerStopped));

        let battle = receivers.get_mut(&Topic::Battle).expect("battle rx");
        assert_eq!(
            battle.recv().await.expect("battle event"),
            Event::Battle(BattleEvent::TurnStarted { unit: UnitId(3) })
        );
        assert!(battle.try_recv().is_err());

        let session = receivers.get_mut(&Topic::Session).expect("session rx");
        assert_eq!(
            session.recv().await.expect("session event"),
            Event::Session(SessionEvent::WorkerStopped)
        );
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Event::Session(SessionEvent::WorkerStarted { seed: 1 }));
    }
}
