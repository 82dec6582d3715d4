//! Pump controller: validated operator commands and the alarm latch.
//!
//! The controller is the single writer of [`CommandState`] and
//! [`AlarmState`].  Every command records a human-readable audit string
//! and a success flag for display.  Maintenance commands (`resetFilter`,
//! `changeOil`) don't touch the physical snapshot; they enqueue a
//! [`MaintenanceAction`] that the simulation engine consumes exactly once
//! on its next tick.

use heapless::Deque;
use log::{info, warn};

use crate::config::{FilterDegradation, PumpConfig};
use crate::error::CommandError;

use super::alarm::{AlarmKind, AlarmState};

/// Audit string shown when no command is pending display.
pub const NO_COMMAND: &str = "None";

/// Pending maintenance queue depth.  Actions are coalesced, so two
/// slots would do; the spare slots keep `push_back` infallible in practice.
const PENDING_DEPTH: usize = 4;

/// One-shot maintenance requests consumed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceAction {
    /// Replace the filter (wear back to 100 %).
    FilterReset,
    /// Refill the oil (level back to 100 %).
    OilChange,
}

impl MaintenanceAction {
    /// Audit string recorded when the action was requested.
    pub const fn label(self) -> &'static str {
        match self {
            Self::FilterReset => "resetFilter",
            Self::OilChange => "changeOil",
        }
    }
}

/// Operator command state.
#[derive(Debug, Clone)]
pub struct CommandState {
    /// Level the pump ramps toward (0–100 %).
    pub target_level: u8,
    /// Description of the last command, e.g. `setOperatingLevel(50)`.
    pub last_command: String,
    pub command_success: bool,
}

/// Validates and applies operator commands; owns the alarm latch.
pub struct PumpController {
    default_operating_level: u8,
    degradation: FilterDegradation,
    command: CommandState,
    alarm: AlarmState,
    pending: Deque<MaintenanceAction, PENDING_DEPTH>,
}

impl PumpController {
    /// Build a controller from configuration.  The pump is commanded to
    /// the default operating level straight away.
    pub fn new(config: &PumpConfig) -> Self {
        info!(
            "Pump configured with: operating level={}%, filter degradation={} minutes, \
             auto-reset={} minutes, oil change={} hours",
            config.default_operating_level,
            config.filter_degradation_minutes,
            config.auto_reset_minutes,
            config.oil_change_hours
        );
        Self {
            default_operating_level: config.default_operating_level,
            degradation: config.filter_degradation(),
            command: CommandState {
                target_level: config.default_operating_level,
                last_command: NO_COMMAND.to_owned(),
                command_success: true,
            },
            alarm: AlarmState::new(config.auto_reset_minutes),
            pending: Deque::new(),
        }
    }

    // ── Operator commands ─────────────────────────────────────

    pub fn stop(&mut self) {
        info!("Stop command processing");
        self.command.target_level = 0;
        self.record("stopPump".to_owned(), true);
    }

    pub fn start(&mut self) {
        info!("Start command processing");
        self.command.target_level = self.default_operating_level;
        self.record("startPump".to_owned(), true);
    }

    /// Set the target level.  Returns the applied level.
    pub fn set_operating_level(&mut self, level: i64) -> Result<u8, CommandError> {
        let audit = format!("setOperatingLevel({level})");
        match u8::try_from(level) {
            Ok(l) if l <= 100 => {
                info!("Setting operating level to {}", l);
                self.command.target_level = l;
                self.record(audit, true);
                Ok(l)
            }
            _ => {
                warn!("Invalid operating level requested: {}", level);
                self.record(audit, false);
                Err(CommandError::LevelOutOfRange(level))
            }
        }
    }

    /// Reconfigure filter wear so a clean filter clogs in
    /// `minutes_to_clog` minutes at full load.
    pub fn set_filter_degradation_rate(&mut self, minutes_to_clog: f64) -> Result<(), CommandError> {
        let audit = format!("setFilterDegradationRate({minutes_to_clog})");
        if !(minutes_to_clog > 0.0) {
            warn!("Invalid filter degradation rate: {}", minutes_to_clog);
            self.record(audit, false);
            return Err(CommandError::InvalidClogMinutes(minutes_to_clog));
        }
        self.degradation = FilterDegradation::from_minutes_to_clog(minutes_to_clog);
        info!(
            "Filter will now clog in approximately {} minutes at full load",
            minutes_to_clog
        );
        self.record(audit, true);
        Ok(())
    }

    pub fn set_auto_reset_minutes(&mut self, minutes: f64) -> Result<(), CommandError> {
        let audit = format!("setAutoResetMinutes({minutes})");
        if !(minutes > 0.0) {
            warn!("Invalid auto-reset minutes: {}", minutes);
            self.record(audit, false);
            return Err(CommandError::InvalidAutoResetMinutes(minutes));
        }
        self.alarm.auto_reset_minutes = minutes;
        info!("Auto-reset time set to {} minutes", minutes);
        self.record(audit, true);
        Ok(())
    }

    /// Request a filter replacement on the next tick.
    pub fn reset_filter(&mut self) {
        self.request(MaintenanceAction::FilterReset);
    }

    /// Request an oil change on the next tick.
    pub fn change_oil(&mut self) {
        self.request(MaintenanceAction::OilChange);
    }

    // ── Alarm latch ───────────────────────────────────────────

    /// Latch an alarm at `now`.  Ignored while already in alarm so the
    /// first trigger of a tick wins.  Returns `true` if the alarm latched.
    pub fn enter_alarm_state(&mut self, kind: AlarmKind, now: f64) -> bool {
        if self.alarm.in_alarm {
            return false;
        }
        info!("Entering alarm state: {}", kind);
        self.alarm.in_alarm = true;
        self.alarm.start_secs = now;
        self.alarm.kind = Some(kind);
        self.alarm.previous_target_level = self.command.target_level;
        self.command.target_level = 0;
        true
    }

    /// Clear the alarm once the dwell time has elapsed.
    ///
    /// Returns `true` exactly once per alarm; the caller must then reset
    /// filter wear to 100 %.
    pub fn check_alarm_auto_reset(&mut self, now: f64) -> bool {
        if !self.alarm.in_alarm {
            return false;
        }
        let elapsed_minutes = self.alarm.elapsed_secs(now) / 60.0;
        if elapsed_minutes < self.alarm.auto_reset_minutes {
            return false;
        }
        info!(
            "Auto-resetting pump after {:.1} minutes in alarm state",
            elapsed_minutes
        );
        self.alarm.in_alarm = false;
        self.command.target_level = self.alarm.previous_target_level;
        true
    }

    // ── Engine hooks ──────────────────────────────────────────

    /// Pop the next pending maintenance action.
    ///
    /// The audit string reverts to `"None"` when it still names the
    /// consumed action; a later command's audit text is left alone.
    pub fn take_pending_action(&mut self) -> Option<MaintenanceAction> {
        let action = self.pending.pop_front()?;
        if self.command.last_command == action.label() {
            self.command.last_command = NO_COMMAND.to_owned();
        }
        Some(action)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn target_level(&self) -> u8 {
        self.command.target_level
    }

    pub fn command_state(&self) -> &CommandState {
        &self.command
    }

    pub fn last_command(&self) -> &str {
        &self.command.last_command
    }

    pub fn command_success(&self) -> bool {
        self.command.command_success
    }

    pub fn in_alarm(&self) -> bool {
        self.alarm.in_alarm
    }

    pub fn alarm(&self) -> &AlarmState {
        &self.alarm
    }

    pub fn auto_reset_minutes(&self) -> f64 {
        self.alarm.auto_reset_minutes
    }

    pub fn degradation(&self) -> FilterDegradation {
        self.degradation
    }

    pub fn default_operating_level(&self) -> u8 {
        self.default_operating_level
    }

    pub fn has_pending(&self, action: MaintenanceAction) -> bool {
        self.pending.iter().any(|a| *a == action)
    }

    // ── Internal ──────────────────────────────────────────────

    fn record(&mut self, audit: String, success: bool) {
        self.command.last_command = audit;
        self.command.command_success = success;
    }

    fn request(&mut self, action: MaintenanceAction) {
        self.record(action.label().to_owned(), true);
        if self.has_pending(action) {
            return;
        }
        if self.pending.push_back(action).is_err() {
            warn!("Maintenance queue full, dropping {}", action.label());
        }
    }
}
