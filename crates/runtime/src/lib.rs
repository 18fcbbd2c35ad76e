//! Async host for a single battle.
//!
//! This crate runs a [`tactics_core::BattleSession`] on a background worker
//! task and exposes it through a cloneable [`RuntimeHandle`]. Consumers embed
//! [`Runtime`] to drive the battle, submit player commands and subscribe to
//! the event stream.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - `workers` keeps the simulation task internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{Event, EventBus, SessionEvent, Topic};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig, RuntimeSummary};
