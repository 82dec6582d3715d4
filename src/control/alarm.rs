//! Alarm kinds and the latched alarm state.
//!
//! ## Alarm lifecycle
//!
//! 1. A trigger condition fires during a tick (see [`crate::safety`]).
//! 2. The controller latches the alarm: the current target level is
//!    remembered and the pump is commanded to 0 %.
//! 3. While latched, further triggers are ignored (first trigger wins).
//! 4. Once `auto_reset_minutes` have elapsed, the controller clears the
//!    latch and restores the remembered target level.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Conditions that put the pump into alarm, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AlarmKind {
    /// Filter wear below 20 %.
    FilterClogged = 0,
    /// Oil level below 15 %.
    OilLow = 1,
    /// Bearing temperature above 75 °C.
    BearingOverheated = 2,
    /// Random supply interruption.
    PowerFailure = 3,
    /// Random seal leak, likelier with a dirty filter.
    Leakage = 4,
}

impl AlarmKind {
    /// Wire name used in logs and published points.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FilterClogged => "FilterClogged",
            Self::OilLow => "OilLow",
            Self::BearingOverheated => "BearingOverheated",
            Self::PowerFailure => "PowerFailure",
            Self::Leakage => "Leakage",
        }
    }

    /// True for the kinds decided by a random draw rather than a threshold.
    pub const fn is_random(self) -> bool {
        matches!(self, Self::PowerFailure | Self::Leakage)
    }
}

impl fmt::Display for AlarmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latched alarm bookkeeping owned by the controller.
#[derive(Debug, Clone, Copy)]
pub struct AlarmState {
    pub in_alarm: bool,
    /// Monotonic seconds at which the alarm was latched.
    pub start_secs: f64,
    /// Target level to restore on auto-reset.
    pub previous_target_level: u8,
    /// Dwell time before auto-reset.  Mirrors the config value but can be
    /// changed at runtime.
    pub auto_reset_minutes: f64,
    /// What latched the current (or most recent) alarm.
    pub kind: Option<AlarmKind>,
}

impl AlarmState {
    pub fn new(auto_reset_minutes: f64) -> Self {
        Self {
            in_alarm: false,
            start_secs: 0.0,
            previous_target_level: 0,
            auto_reset_minutes,
            kind: None,
        }
    }

    /// Seconds spent in the current alarm.
    pub fn elapsed_secs(&self, now: f64) -> f64 {
        now - self.start_secs
    }

    /// Seconds until auto-reset; 0 when not in alarm.
    pub fn remaining_secs(&self, now: f64) -> f64 {
        if !self.in_alarm {
            return 0.0;
        }
        (self.auto_reset_minutes * 60.0 - self.elapsed_secs(now)).max(0.0)
    }
}
