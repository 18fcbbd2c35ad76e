//! Topic-based event bus for runtime events.
//!
//! Battle events from the core and session lifecycle events from the worker
//! are published to separate topics so consumers subscribe only to what
//! they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::SessionEvent;
