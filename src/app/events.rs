//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log a line, refresh the point table.

use crate::control::AlarmKind;
use crate::sim::{PumpStatus, Snapshot};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Per-tick telemetry snapshot.
    Telemetry(TelemetryData),

    /// The derived pump status changed.
    StatusChanged { from: PumpStatus, to: PumpStatus },

    /// A trigger latched an alarm.
    AlarmRaised(AlarmKind),

    /// The alarm auto-reset after its dwell time.
    AlarmCleared,

    /// The tick interval was changed.
    IntervalChanged(f64),

    /// The application service has started (carries initial telemetry).
    Started(TelemetryData),
}

/// Everything the presenter publishes after a tick: the physical snapshot
/// plus controller state and configuration mirrors.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub snapshot: Snapshot,
    pub target_level: u8,
    pub last_command: String,
    pub command_success: bool,
    pub alarm_kind: Option<AlarmKind>,
    pub auto_reset_minutes: f64,
    pub default_operating_level: u8,
    pub update_interval_secs: f64,
}
