//! Pump physics.
//!
//! Simplified heuristics for wear, temperatures, flow and power, driven
//! one tick at a time by [`SimulationEngine`].

pub mod engine;
pub mod hydraulics;
pub mod snapshot;
pub mod thermal;
pub mod wear;

pub use engine::{SimulationEngine, TickReport};
pub use snapshot::{PumpStatus, Snapshot};
