//! Inflow and bearing temperature models.
//!
//! ```text
//!  inflow  = mid + amp·sin(2π·cycle) + jitter        (24 h cycle)
//!
//!  bearing ──heat 0.3·dt──▶ target(level, oil, filter)
//!          ◀─cool 0.1·dt──
//!  idle:   ──cool 0.2·dt──▶ base
//! ```

use core::f64::consts::PI;

use crate::app::ports::RandomSource;
use crate::config::PumpConfig;

/// Length of the inflow temperature cycle.
pub const TEMP_CYCLE_HOURS: f64 = 24.0;

const INFLOW_JITTER: f64 = 0.5;
const BEARING_JITTER: f64 = 0.2;

const BEARING_IDLE_COOL_RATE: f64 = 0.2;
const BEARING_HEAT_RATE: f64 = 0.3;
const BEARING_COOL_RATE: f64 = 0.1;

/// Fraction of the current 24 h cycle elapsed after `elapsed_secs`.
pub fn cycle_position(elapsed_secs: f64) -> f64 {
    let hours = elapsed_secs / 3600.0;
    hours.rem_euclid(TEMP_CYCLE_HOURS) / TEMP_CYCLE_HOURS
}

/// Inflow temperature `elapsed_secs` after the cycle anchor.
pub fn inflow_temperature(
    cfg: &PumpConfig,
    elapsed_secs: f64,
    rng: &mut impl RandomSource,
) -> f64 {
    let amplitude = (cfg.max_inflow_temp - cfg.min_inflow_temp) / 2.0;
    let midpoint = (cfg.max_inflow_temp + cfg.min_inflow_temp) / 2.0;
    let temp = midpoint + amplitude * (cycle_position(elapsed_secs) * 2.0 * PI).sin();
    temp + rng.uniform(-INFLOW_JITTER, INFLOW_JITTER)
}

/// Temperature the bearing settles at for the given load and wear.
///
/// Low oil adds up to 50 %, a clogged filter up to 30 % of the
/// base-to-max span.
fn bearing_target(cfg: &PumpConfig, level: u8, oil_level: f64, filter_state: f64) -> f64 {
    let level_factor = f64::from(level) / 100.0;
    let oil_factor = 1.0 + ((1.0 - oil_level / 100.0) * 0.5).max(0.0);
    let filter_factor = 1.0 + ((1.0 - filter_state / 100.0) * 0.3).max(0.0);
    cfg.base_bearing_temp
        + (cfg.max_bearing_temp - cfg.base_bearing_temp) * level_factor * oil_factor * filter_factor
}

/// Advance the bearing temperature by `dt` seconds.
pub fn bearing_temperature(
    cfg: &PumpConfig,
    current: f64,
    level: u8,
    oil_level: f64,
    filter_state: f64,
    dt: f64,
    rng: &mut impl RandomSource,
) -> f64 {
    if level == 0 {
        return cfg
            .base_bearing_temp
            .max(current - BEARING_IDLE_COOL_RATE * dt);
    }

    let target = bearing_target(cfg, level, oil_level, filter_state)
        + rng.uniform(-BEARING_JITTER, BEARING_JITTER);

    if current < target {
        target.min(current + BEARING_HEAT_RATE * dt)
    } else {
        target.max(current - BEARING_COOL_RATE * dt)
    }
}
