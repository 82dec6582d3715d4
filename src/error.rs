//! Unified error types for the pump simulator.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's error handling uniform.  Command and configuration
//! rejections are `Copy` so they can be returned from the controller and
//! logged without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the simulator funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// An operator command was rejected (argument out of range).
    Command(CommandError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// The network transport failed.
    Transport(&'static str),
    /// A request frame could not be interpreted.
    Protocol(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Command rejections
// ---------------------------------------------------------------------------

/// Validation failures for operator commands.  The controller leaves its
/// state untouched whenever one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandError {
    /// Operating level outside `0..=100`.
    LevelOutOfRange(i64),
    /// Minutes-to-clog must be strictly positive.
    InvalidClogMinutes(f64),
    /// Auto-reset dwell must be strictly positive.
    InvalidAutoResetMinutes(f64),
    /// Tick interval outside `0.1..=60` seconds.
    IntervalOutOfRange(f64),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelOutOfRange(l) => write!(f, "operating level {l} not in 0..=100"),
            Self::InvalidClogMinutes(m) => write!(f, "minutes to clog {m} must be > 0"),
            Self::InvalidAutoResetMinutes(m) => write!(f, "auto-reset minutes {m} must be > 0"),
            Self::IntervalOutOfRange(s) => {
                write!(f, "update interval {s}s not in 0.1..=60")
            }
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A value could not be parsed.  Carries the offending key.
    Unparsable(&'static str),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparsable(key) => write!(f, "{key} is not a valid number"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
