//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the battle session and drives it step by step.

mod simulation;

pub use simulation::{Request, SimulationWorker};
