//! The published physical state of the simulated pump.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Derived pump status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PumpStatus {
    Idle,
    Running,
    Alarm,
}

impl PumpStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Alarm => "Alarm",
        }
    }
}

impl fmt::Display for PumpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point-in-time snapshot of every simulated measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Actual level, ramping toward the commanded target (0–100 %).
    pub current_level: u8,
    pub status: PumpStatus,
    /// 100 = clean, 0 = fully clogged.
    pub filter_state: f64,
    /// 100 = full, 0 = empty.
    pub oil_level: f64,
    /// °C
    pub inflow_temp: f64,
    /// °C
    pub bearing_temp: f64,
    /// l/s
    pub flow: f64,
    /// W
    pub power: f64,
    /// Accrued run hours; never decreases.
    pub run_hours: f64,
    /// 1 while an alarm is active.
    pub active_alarm: u8,
    /// Seconds until the alarm auto-resets.
    pub alarm_time_remaining: f64,
    /// Minutes a clean filter lasts at full load, for display.
    pub degradation_estimate_minutes: u32,
}

impl Snapshot {
    /// State at process start.
    pub fn initial(base_bearing_temp: f64) -> Self {
        Self {
            current_level: 0,
            status: PumpStatus::Idle,
            filter_state: 100.0,
            oil_level: 100.0,
            inflow_temp: 20.0,
            bearing_temp: base_bearing_temp,
            flow: 0.0,
            power: 0.0,
            run_hours: 0.0,
            active_alarm: 0,
            alarm_time_remaining: 0.0,
            degradation_estimate_minutes: super::wear::DEFAULT_DEGRADATION_ESTIMATE_MINUTES,
        }
    }
}
