//! Port traits: the hexagonal boundary between the simulation core and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (randomness, clock, event sinks, configuration)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the core never reads the wall clock or
//! a global RNG directly and every tick can be replayed in tests.

use crate::config::PumpConfig;
use crate::error::ConfigError;

// ───────────────────────────────────────────────────────────────
// Random source (driven adapter: entropy → domain)
// ───────────────────────────────────────────────────────────────

/// Bounded randomness consumed by the tick.
///
/// The engine draws in a fixed order each tick, so a scripted source
/// fully determines a tick's outcome.
pub trait RandomSource {
    /// Uniform integer in `lo..=hi`.
    fn int_inclusive(&mut self, lo: u8, hi: u8) -> u8;

    /// Uniform float in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64;

    /// Uniform float in `[0, 1)` for probability draws.
    fn unit(&mut self) -> f64 {
        self.uniform(0.0, 1.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: clock → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.
pub trait TimePort {
    /// Seconds since the simulation started.
    fn now_secs(&self) -> f64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / presenter)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log, point table).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: environment → domain)
// ───────────────────────────────────────────────────────────────

/// Loads pump configuration.
///
/// Implementations MUST validate values before returning them.  Invalid
/// ranges are rejected with [`ConfigError::ValidationFailed`], never
/// silently clamped.
pub trait ConfigPort {
    fn load(&self) -> Result<PumpConfig, ConfigError>;
}
