//! Consumable wear: filter clogging and oil depletion.
//!
//! Configured rates are per minute (filter) or per run hour (oil); both
//! are scaled to the tick's `dt` in seconds.

use crate::config::FilterDegradation;

/// Shown when the load factor is not positive.
pub const DEFAULT_DEGRADATION_ESTIMATE_MINUTES: u32 = 30;

/// Filter wear over `dt` seconds at `level` %.  Callers only invoke this
/// while the pump turns (`level > 0`).
pub fn degrade_filter(filter_state: f64, level: u8, rates: FilterDegradation, dt: f64) -> f64 {
    let base_per_sec = rates.base_rate / 60.0;
    let load_per_sec = rates.load_factor / 60.0;
    let degradation = (base_per_sec + f64::from(level) / 100.0 * load_per_sec) * dt;
    (filter_state - degradation).max(0.0)
}

/// Oil use over `dt` seconds of running at `level` %.
///
/// At half the full-load rate when barely turning, full rate at 100 %.
pub fn deplete_oil(oil_level: f64, level: u8, oil_change_hours: u32, dt: f64) -> f64 {
    let per_hour = 100.0 / f64::from(oil_change_hours);
    let per_sec = per_hour / 3600.0;
    let depletion = per_sec * (0.5 + f64::from(level) / 200.0) * dt;
    (oil_level - depletion).max(0.0)
}

/// Minutes for a clean filter to clog at full load under `rates`.
pub fn degradation_estimate(rates: FilterDegradation) -> u32 {
    if rates.load_factor > 0.0 {
        (100.0 / (rates.base_rate + rates.load_factor)).floor() as u32
    } else {
        DEFAULT_DEGRADATION_ESTIMATE_MINUTES
    }
}
