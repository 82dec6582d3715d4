//! Flow and power draw.
//!
//! A clogging filter halves flow at worst and raises power through both
//! lost efficiency and back-pressure.

use crate::app::ports::RandomSource;

/// Flow at 100 % level with a clean filter (l/s).
pub const MAX_FLOW_RATE: f64 = 10.0;

/// Draw of the electronics whenever the motor turns (W).
pub const BASE_POWER: f64 = 100.0;

/// Watts per percent of level.
const POWER_PER_LEVEL: f64 = 5.0;

const VARIATION: (f64, f64) = (0.95, 1.05);

pub fn flow(level: u8, filter_state: f64, rng: &mut impl RandomSource) -> f64 {
    let filter_factor = 0.5 + (filter_state / 100.0) * 0.5;
    let base_flow = f64::from(level) / 100.0 * MAX_FLOW_RATE * filter_factor;
    (base_flow * rng.uniform(VARIATION.0, VARIATION.1)).max(0.0)
}

/// Power draw.  No random draw is taken while the pump is stopped.
pub fn power(level: u8, filter_state: f64, rng: &mut impl RandomSource) -> f64 {
    if level == 0 {
        return 0.0;
    }
    // 1.0 (clean) – 2.0 (clogged)
    let efficiency_factor = 1.0 + (1.0 - filter_state / 100.0);
    let level_power = f64::from(level) * POWER_PER_LEVEL;
    let clogging_resistance = (100.0 - filter_state) / 100.0;
    let clogging_power = level_power * clogging_resistance * 2.0;

    (BASE_POWER + level_power * efficiency_factor + clogging_power)
        * rng.uniform(VARIATION.0, VARIATION.1)
}
