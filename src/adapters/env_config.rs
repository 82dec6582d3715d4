//! Environment configuration adapter.
//!
//! Implements [`ConfigPort`] by reading `PUMP_*` variables.  Each key is
//! parsed and range-checked on its own: a bad value is logged and that
//! key keeps its default.  The assembled config is then validated as a
//! whole (cross-field rules such as min ≤ max temperature).

use std::collections::HashMap;
use std::str::FromStr;

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::{PumpConfig, interval_in_range, validate_config};
use crate::error::ConfigError;

pub const KEY_DEFAULT_OPERATING_LEVEL: &str = "PUMP_DEFAULT_OPERATING_LEVEL";
pub const KEY_FILTER_DEGRADATION_RATE: &str = "PUMP_FILTER_DEGRADATION_RATE";
pub const KEY_AUTO_RESET_MINUTES: &str = "PUMP_AUTO_RESET_MINUTES";
pub const KEY_OIL_CHANGE_HOURS: &str = "PUMP_OIL_CHANGE_HOURS";
pub const KEY_MIN_INFLOW_TEMP: &str = "PUMP_MIN_INFLOW_TEMP";
pub const KEY_MAX_INFLOW_TEMP: &str = "PUMP_MAX_INFLOW_TEMP";
pub const KEY_BASE_BEARING_TEMP: &str = "PUMP_BASE_BEARING_TEMP";
pub const KEY_MAX_BEARING_TEMP: &str = "PUMP_MAX_BEARING_TEMP";
pub const KEY_UPDATE_INTERVAL: &str = "PUMP_UPDATE_INTERVAL";
pub const KEY_LISTEN_PORT: &str = "PUMP_LISTEN_PORT";
pub const KEY_RNG_SEED: &str = "PUMP_RNG_SEED";

const PREFIX: &str = "PUMP_";

/// Reads configuration from a snapshot of the process environment.
pub struct EnvConfigAdapter {
    vars: HashMap<String, String>,
}

impl EnvConfigAdapter {
    /// Capture the current `PUMP_*` environment.
    pub fn new() -> Self {
        Self::from_vars(std::env::vars().filter(|(k, _)| k.starts_with(PREFIX)))
    }

    /// Build from explicit key/value pairs.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// [`load`](ConfigPort::load), falling back to defaults wholesale
    /// when the assembled config is inconsistent.
    pub fn load_or_default(&self) -> PumpConfig {
        self.load().unwrap_or_else(|e| {
            warn!("Configuration rejected ({e}), using defaults");
            PumpConfig::default()
        })
    }

    /// Parse `key`, keeping `default` when unset, unparsable or rejected
    /// by `valid`.
    fn read<T>(&self, key: &'static str, default: T, valid: impl Fn(&T) -> bool) -> T
    where
        T: FromStr + Copy,
    {
        let Some(raw) = self.vars.get(key) else {
            return default;
        };
        match raw.trim().parse::<T>() {
            Ok(v) if valid(&v) => v,
            Ok(_) => {
                warn!("{}: {:?}", ConfigError::ValidationFailed(key), raw);
                default
            }
            Err(_) => {
                warn!("{}: {:?}", ConfigError::Unparsable(key), raw);
                default
            }
        }
    }

    /// An unparsable seed falls back to entropy seeding.
    fn seed(&self) -> Option<u64> {
        let raw = self.vars.get(KEY_RNG_SEED)?;
        raw.trim()
            .parse()
            .inspect_err(|_| warn!("{}: {:?}", ConfigError::Unparsable(KEY_RNG_SEED), raw))
            .ok()
    }
}

impl Default for EnvConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPort for EnvConfigAdapter {
    fn load(&self) -> Result<PumpConfig, ConfigError> {
        let d = PumpConfig::default();
        let positive = |v: &f64| *v > 0.0;
        let finite = |v: &f64| v.is_finite();

        let cfg = PumpConfig {
            default_operating_level: self.read(
                KEY_DEFAULT_OPERATING_LEVEL,
                d.default_operating_level,
                |v| *v <= 100,
            ),
            filter_degradation_minutes: self.read(
                KEY_FILTER_DEGRADATION_RATE,
                d.filter_degradation_minutes,
                positive,
            ),
            auto_reset_minutes: self.read(KEY_AUTO_RESET_MINUTES, d.auto_reset_minutes, positive),
            oil_change_hours: self.read(KEY_OIL_CHANGE_HOURS, d.oil_change_hours, |v| *v > 0),
            min_inflow_temp: self.read(KEY_MIN_INFLOW_TEMP, d.min_inflow_temp, finite),
            max_inflow_temp: self.read(KEY_MAX_INFLOW_TEMP, d.max_inflow_temp, finite),
            base_bearing_temp: self.read(KEY_BASE_BEARING_TEMP, d.base_bearing_temp, finite),
            max_bearing_temp: self.read(KEY_MAX_BEARING_TEMP, d.max_bearing_temp, finite),
            update_interval_secs: self.read(KEY_UPDATE_INTERVAL, d.update_interval_secs, |v| {
                interval_in_range(*v)
            }),
            listen_port: self.read(KEY_LISTEN_PORT, d.listen_port, |_| true),
            rng_seed: self.seed(),
        };

        validate_config(&cfg)?;
        info!("Configuration loaded: {:?}", cfg);
        Ok(cfg)
    }
}
