//! Alarm trigger supervisor.
//!
//! The supervisor runs **every tick after the temperature update** and
//! decides whether the pump must enter alarm.
//!
//! ## Trigger order
//!
//! 1. Filter wear below 20 %            → `FilterClogged`
//! 2. Oil level below 15 %              → `OilLow`
//! 3. Bearing above 75 °C               → `BearingOverheated`
//! 4. Random draw below `0.002·dt`      → `PowerFailure`
//! 5. Random draw below `0.001·(1 + (100 − filter)/20)·dt` → `Leakage`
//!
//! The first condition that holds wins.  Both random draws are taken on
//! every tick, in alarm or not, so the random stream does not depend on
//! alarm history.
//!
//! Besides the winning trigger the supervisor keeps a bitmask of every
//! condition that held on the last evaluation, and logs rising and
//! falling edges of it.  A threshold crossing logs at `error` while the
//! pump is healthy and at `warn` under a latched alarm.  Random draws
//! only ever log at `debug`; the controller reports a winning draw.

use log::{Level, debug, info, log};

use crate::app::ports::RandomSource;
use crate::control::AlarmKind;
use crate::sim::Snapshot;

/// Filter wear threshold (%).
pub const FILTER_CLOGGED_BELOW: f64 = 20.0;
/// Oil level threshold (%).
pub const OIL_LOW_BELOW: f64 = 15.0;
/// Bearing temperature threshold (°C).
pub const BEARING_OVERHEAT_ABOVE: f64 = 75.0;
/// Power failure probability per second.
pub const POWER_FAILURE_RATE: f64 = 0.002;
/// Leakage probability per second with a clean filter.
pub const LEAKAGE_BASE_RATE: f64 = 0.001;

const fn mask(kind: AlarmKind) -> u8 {
    1 << kind as u8
}

/// Leakage probability for one tick of `dt` seconds.
pub fn leakage_probability(filter_state: f64, dt: f64) -> f64 {
    LEAKAGE_BASE_RATE * (1.0 + (100.0 - filter_state) / 20.0) * dt
}

/// Alarm trigger supervisor.
#[derive(Debug, Default)]
pub struct SafetySupervisor {
    /// Conditions that held on the last evaluation.
    conditions: u8,
}

impl SafetySupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate every trigger against the post-thermal snapshot.
    ///
    /// Returns the first trigger that holds while not `in_alarm`.
    pub fn evaluate(
        &mut self,
        snap: &Snapshot,
        in_alarm: bool,
        dt: f64,
        rng: &mut impl RandomSource,
    ) -> Option<AlarmKind> {
        let power_draw = rng.unit();
        let leakage_draw = rng.unit();

        let checks = [
            (AlarmKind::FilterClogged, snap.filter_state < FILTER_CLOGGED_BELOW),
            (AlarmKind::OilLow, snap.oil_level < OIL_LOW_BELOW),
            (
                AlarmKind::BearingOverheated,
                snap.bearing_temp > BEARING_OVERHEAT_ABOVE,
            ),
            (AlarmKind::PowerFailure, power_draw < POWER_FAILURE_RATE * dt),
            (
                AlarmKind::Leakage,
                leakage_draw < leakage_probability(snap.filter_state, dt),
            ),
        ];

        let mut first = None;
        for (kind, condition) in checks {
            self.track(kind, condition, in_alarm);
            if condition && first.is_none() {
                first = Some(kind);
            }
        }

        if in_alarm { None } else { first }
    }

    /// Bitmask of the conditions that held on the last evaluation,
    /// indexed by `AlarmKind as u8`.
    pub fn conditions(&self) -> u8 {
        self.conditions
    }

    /// True if `kind`'s condition held on the last evaluation.
    pub fn holds(&self, kind: AlarmKind) -> bool {
        self.conditions & mask(kind) != 0
    }

    // ── Internal ──────────────────────────────────────────────────

    fn track(&mut self, kind: AlarmKind, condition: bool, in_alarm: bool) {
        let bit = mask(kind);
        if condition {
            if self.conditions & bit == 0 {
                log!(set_edge_level(kind, in_alarm), "ALARM CONDITION SET: {kind}");
            }
            self.conditions |= bit;
        } else {
            if self.conditions & bit != 0 {
                if kind.is_random() {
                    debug!("ALARM CONDITION CLEARED: {kind}");
                } else {
                    info!("ALARM CONDITION CLEARED: {kind}");
                }
            }
            self.conditions &= !bit;
        }
    }
}

/// Log level for a rising condition edge.
fn set_edge_level(kind: AlarmKind, in_alarm: bool) -> Level {
    match (kind.is_random(), in_alarm) {
        (true, _) => Level::Debug,
        (false, true) => Level::Warn,
        (false, false) => Level::Error,
    }
}
