//! Operator-facing control: command validation and the alarm latch.

pub mod alarm;
pub mod controller;

pub use alarm::{AlarmKind, AlarmState};
pub use controller::{CommandState, MaintenanceAction, PumpController};
