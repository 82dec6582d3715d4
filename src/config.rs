//! Pump configuration parameters
//!
//! All tunable parameters for the simulated pump.  Values are sourced
//! from the process environment at startup (see
//! [`EnvConfigAdapter`](crate::adapters::env_config::EnvConfigAdapter));
//! a subset can later be changed through validated controller commands.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Idle wear rate in %/min, fixed on every recomputation.
pub const FILTER_BASE_RATE: f64 = 0.1;

/// Accepted tick interval range in seconds.
pub const MIN_UPDATE_INTERVAL_SECS: f64 = 0.1;
pub const MAX_UPDATE_INTERVAL_SECS: f64 = 60.0;

/// Filter wear rates, in % per minute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterDegradation {
    /// Minimal wear even at the lowest running level.
    pub base_rate: f64,
    /// Additional wear scaled by operating level (0–100 %).
    pub load_factor: f64,
}

impl FilterDegradation {
    /// Rates that take the filter from 100 % to 0 % in `minutes_to_clog`
    /// minutes at full load.  Callers validate `minutes_to_clog > 0`.
    pub fn from_minutes_to_clog(minutes_to_clog: f64) -> Self {
        Self {
            base_rate: FILTER_BASE_RATE,
            load_factor: 100.0 / minutes_to_clog - FILTER_BASE_RATE,
        }
    }
}

/// Core pump configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpConfig {
    // --- Operation ---
    /// Level applied by `startPump` and at process start (0-100%)
    pub default_operating_level: u8,
    /// Minutes for a clean filter to clog at sustained full load
    pub filter_degradation_minutes: f64,
    /// Minutes the pump stays in alarm before resetting itself
    pub auto_reset_minutes: f64,
    /// Run hours until the oil is considered due
    pub oil_change_hours: u32,

    // --- Temperatures (°C) ---
    pub min_inflow_temp: f64,
    pub max_inflow_temp: f64,
    pub base_bearing_temp: f64,
    pub max_bearing_temp: f64,

    // --- Timing ---
    /// Tick interval (seconds)
    pub update_interval_secs: f64,

    // --- Presentation ---
    /// TCP port for the telemetry RPC server
    pub listen_port: u16,
    /// Fixed seed for reproducible runs; entropy-seeded when `None`
    pub rng_seed: Option<u64>,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            default_operating_level: 75,
            filter_degradation_minutes: 30.0,
            auto_reset_minutes: 3.0,
            oil_change_hours: 2000,

            min_inflow_temp: 15.0,
            max_inflow_temp: 25.0,
            base_bearing_temp: 35.0,
            max_bearing_temp: 80.0,

            update_interval_secs: 2.0,

            listen_port: 4840,
            rng_seed: None,
        }
    }
}

impl PumpConfig {
    /// Wear rates derived from `filter_degradation_minutes`.
    pub fn filter_degradation(&self) -> FilterDegradation {
        FilterDegradation::from_minutes_to_clog(self.filter_degradation_minutes)
    }
}

/// Whether `secs` is an acceptable tick interval.
pub fn interval_in_range(secs: f64) -> bool {
    (MIN_UPDATE_INTERVAL_SECS..=MAX_UPDATE_INTERVAL_SECS).contains(&secs)
}

/// Range-check every field.  Invalid values are rejected, never clamped.
pub fn validate_config(cfg: &PumpConfig) -> Result<(), ConfigError> {
    if cfg.default_operating_level > 100 {
        return Err(ConfigError::ValidationFailed(
            "default_operating_level must be 0–100",
        ));
    }
    if !(cfg.filter_degradation_minutes > 0.0) {
        return Err(ConfigError::ValidationFailed(
            "filter_degradation_minutes must be > 0",
        ));
    }
    if !(cfg.auto_reset_minutes > 0.0) {
        return Err(ConfigError::ValidationFailed(
            "auto_reset_minutes must be > 0",
        ));
    }
    if cfg.oil_change_hours == 0 {
        return Err(ConfigError::ValidationFailed(
            "oil_change_hours must be > 0",
        ));
    }
    if !(cfg.min_inflow_temp <= cfg.max_inflow_temp) {
        return Err(ConfigError::ValidationFailed(
            "min_inflow_temp must not exceed max_inflow_temp",
        ));
    }
    if !(cfg.base_bearing_temp <= cfg.max_bearing_temp) {
        return Err(ConfigError::ValidationFailed(
            "base_bearing_temp must not exceed max_bearing_temp",
        ));
    }
    if !interval_in_range(cfg.update_interval_secs) {
        return Err(ConfigError::ValidationFailed(
            "update_interval_secs must be 0.1–60",
        ));
    }
    Ok(())
}
