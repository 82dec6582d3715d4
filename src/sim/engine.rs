//! Simulation engine: advances the physical snapshot one tick at a time.
//!
//! ```text
//!  auto-reset → ramp → status → maintenance → filter → oil
//!     → inflow → bearing → triggers → remaining → flow → power
//!     → run hours → estimate → invariant check
//! ```
//!
//! The order is fixed; the random stream is consumed in the same order,
//! so a scripted [`RandomSource`] replays a tick exactly.

use log::info;

use crate::app::ports::RandomSource;
use crate::config::PumpConfig;
use crate::control::{AlarmKind, MaintenanceAction, PumpController};
use crate::safety::SafetySupervisor;

use super::snapshot::{PumpStatus, Snapshot};
use super::{hydraulics, thermal, wear};

/// Largest ramp step toward a higher target (%/tick).
const RAMP_UP_MAX: u8 = 5;
/// Largest ramp step toward a lower target (%/tick).
const RAMP_DOWN_MAX: u8 = 3;

/// Run hours accrue this many times faster than wall time.
pub const RUN_HOURS_ACCELERATION: f64 = 12.0;

/// What happened during one tick, beyond the snapshot itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// The alarm latch cleared at the start of the tick.
    pub auto_reset: bool,
    /// A trigger latched a new alarm.
    pub raised: Option<AlarmKind>,
    pub filter_replaced: bool,
    pub oil_changed: bool,
}

/// Owns the evolving [`Snapshot`].
pub struct SimulationEngine {
    config: PumpConfig,
    snapshot: Snapshot,
    /// Anchor of the inflow temperature cycle.
    cycle_start_secs: f64,
    supervisor: SafetySupervisor,
}

impl SimulationEngine {
    /// Build an engine whose temperature cycle starts at `now`.
    pub fn new(config: &PumpConfig, now: f64) -> Self {
        Self {
            snapshot: Snapshot::initial(config.base_bearing_temp),
            config: config.clone(),
            cycle_start_secs: now,
            supervisor: SafetySupervisor::new(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn supervisor(&self) -> &SafetySupervisor {
        &self.supervisor
    }

    /// Replace the snapshot wholesale.  Used to stage scenarios.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
    }

    /// Advance the simulation by `dt` seconds at time `now`.
    ///
    /// # Panics
    ///
    /// If the tick leaves the snapshot outside its invariants.
    pub fn tick(
        &mut self,
        controller: &mut PumpController,
        dt: f64,
        now: f64,
        rng: &mut impl RandomSource,
    ) -> TickReport {
        let mut report = TickReport::default();
        let prev_run_hours = self.snapshot.run_hours;
        let snap = &mut self.snapshot;
        snap.active_alarm = 0;

        // 1. Auto-reset
        if controller.check_alarm_auto_reset(now) {
            snap.filter_state = 100.0;
            report.auto_reset = true;
        }

        // 2. Ramp toward target
        let target = controller.target_level();
        if snap.current_level < target {
            let step = rng.int_inclusive(1, RAMP_UP_MAX);
            snap.current_level = target.min(snap.current_level.saturating_add(step));
        } else if snap.current_level > target {
            let step = rng.int_inclusive(1, RAMP_DOWN_MAX);
            snap.current_level = target.max(snap.current_level.saturating_sub(step));
        }
        let level = snap.current_level;

        // 3. Status
        snap.status = if controller.in_alarm() {
            PumpStatus::Alarm
        } else if level == 0 {
            PumpStatus::Idle
        } else {
            PumpStatus::Running
        };

        // 4. Maintenance
        while let Some(action) = controller.take_pending_action() {
            match action {
                MaintenanceAction::FilterReset => {
                    snap.filter_state = 100.0;
                    report.filter_replaced = true;
                    info!("Filter manually reset to 100%");
                }
                MaintenanceAction::OilChange => {
                    snap.oil_level = 100.0;
                    report.oil_changed = true;
                    info!("Oil manually changed, level reset to 100%");
                }
            }
        }

        // 5. Filter wear
        if level > 0 {
            snap.filter_state =
                wear::degrade_filter(snap.filter_state, level, controller.degradation(), dt);
        }

        // 6. Oil
        if snap.status == PumpStatus::Running {
            snap.oil_level =
                wear::deplete_oil(snap.oil_level, level, self.config.oil_change_hours, dt);
        }

        // 7. Inflow temperature
        snap.inflow_temp =
            thermal::inflow_temperature(&self.config, now - self.cycle_start_secs, rng);

        // 8. Bearing temperature
        snap.bearing_temp = thermal::bearing_temperature(
            &self.config,
            snap.bearing_temp,
            level,
            snap.oil_level,
            snap.filter_state,
            dt,
            rng,
        );

        // 9. Alarm triggers
        if let Some(kind) = self
            .supervisor
            .evaluate(snap, controller.in_alarm(), dt, rng)
        {
            if controller.enter_alarm_state(kind, now) {
                snap.active_alarm = 1;
                report.raised = Some(kind);
            }
        }

        // 10. Alarm time remaining
        if controller.in_alarm() {
            snap.alarm_time_remaining = controller.alarm().remaining_secs(now);
            snap.active_alarm = 1;
        } else {
            snap.alarm_time_remaining = 0.0;
        }

        // 11–12. Flow and power
        snap.flow = hydraulics::flow(level, snap.filter_state, rng);
        snap.power = hydraulics::power(level, snap.filter_state, rng);

        // 13. Run hours
        if snap.status == PumpStatus::Running {
            snap.run_hours += dt / 3600.0 * RUN_HOURS_ACCELERATION;
        }

        // 14. Degradation estimate
        snap.degradation_estimate_minutes = wear::degradation_estimate(controller.degradation());

        check_invariants(snap, prev_run_hours);
        report
    }
}

fn check_invariants(snap: &Snapshot, prev_run_hours: f64) {
    assert!(snap.current_level <= 100, "level {} out of range", snap.current_level);
    assert!(
        (0.0..=100.0).contains(&snap.filter_state),
        "filter state {} out of range",
        snap.filter_state
    );
    assert!(
        (0.0..=100.0).contains(&snap.oil_level),
        "oil level {} out of range",
        snap.oil_level
    );
    assert!(snap.run_hours >= prev_run_hours, "run hours decreased");
    assert!(snap.alarm_time_remaining >= 0.0, "negative alarm time remaining");
    assert!(snap.flow >= 0.0 && snap.power >= 0.0, "negative flow or power");
}
