//! Inbound commands to the application service.
//!
//! These represent operator actions requested through the presenter.
//! Each variant maps 1:1 onto a [`PumpController`](crate::control::PumpController)
//! operation (or the service's tick interval), with typed arguments.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PumpCommand {
    /// Command the pump to 0 %.
    Stop,

    /// Command the pump to the default operating level.
    Start,

    /// Command a specific level (validated to 0–100).
    SetOperatingLevel(i64),

    /// Minutes for a clean filter to clog at full load (must be > 0).
    SetFilterDegradationRate(f64),

    /// Alarm dwell time before auto-reset (must be > 0).
    SetAutoResetMinutes(f64),

    /// Replace the filter on the next tick.
    ResetFilter,

    /// Refill the oil on the next tick.
    ChangeOil,

    /// Change the tick cadence (0.1–60 s).
    SetUpdateInterval(f64),
}

impl PumpCommand {
    /// Method name exposed by the presenter.
    pub const fn method_name(&self) -> &'static str {
        match self {
            Self::Stop => "stopPump",
            Self::Start => "startPump",
            Self::SetOperatingLevel(_) => "setOperatingLevel",
            Self::SetFilterDegradationRate(_) => "setFilterDegradationRate",
            Self::SetAutoResetMinutes(_) => "setAutoResetMinutes",
            Self::ResetFilter => "resetFilter",
            Self::ChangeOil => "changeOil",
            Self::SetUpdateInterval(_) => "setUpdateInterval",
        }
    }
}

/// Successful command result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandOutcome {
    /// The command was applied.
    Applied,
    /// An operating level was applied; carries the level.
    Level(u8),
}
