//! End-to-end tick scenarios: AppService → controller → engine → events.

use pumpsim::app::commands::{CommandOutcome, PumpCommand};
use pumpsim::app::events::AppEvent;
use pumpsim::app::service::AppService;
use pumpsim::config::PumpConfig;
use pumpsim::control::AlarmKind;
use pumpsim::error::CommandError;
use pumpsim::sim::{PumpStatus, Snapshot};

use super::mock_ports::{ManualClock, RecordingSink, ScriptedRng};

struct Rig {
    app: AppService,
    rng: ScriptedRng,
    clock: ManualClock,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        Self::with_rng(ScriptedRng::new())
    }

    fn with_rng(rng: ScriptedRng) -> Self {
        let mut sink = RecordingSink::new();
        let mut app = AppService::new(&PumpConfig::default(), 0.0);
        app.start(&mut sink);
        Self {
            app,
            rng,
            clock: ManualClock::at(0.0),
            sink,
        }
    }

    /// Advance the clock by one interval and tick.
    fn step(&mut self) {
        self.clock.advance(self.app.update_interval_secs());
        self.app.tick(&mut self.rng, &self.clock, &mut self.sink);
    }

    fn tick_at(&mut self, now: f64) {
        self.clock.set(now);
        self.app.tick(&mut self.rng, &self.clock, &mut self.sink);
    }

    fn command(&mut self, cmd: PumpCommand) -> Result<CommandOutcome, CommandError> {
        self.app.handle_command(cmd, &mut self.sink)
    }

    fn stage(&mut self, f: impl FnOnce(&mut Snapshot)) {
        let mut snap = *self.app.snapshot();
        f(&mut snap);
        self.app.restore_snapshot(snap);
    }

    fn snap(&self) -> Snapshot {
        *self.app.snapshot()
    }
}

// ── Ramp ──────────────────────────────────────────────────────

#[test]
fn ramps_to_default_level_in_five_percent_steps() {
    let mut rig = Rig::new();
    rig.step();
    assert_eq!(rig.snap().current_level, 5);
    assert_eq!(rig.snap().status, PumpStatus::Running);

    for _ in 1..15 {
        rig.step();
    }
    assert_eq!(rig.snap().current_level, 75);
    rig.step();
    assert_eq!(rig.snap().current_level, 75, "no overshoot");
}

#[test]
fn stop_ramps_down_in_three_percent_steps_then_idles() {
    let mut rig = Rig::new();
    for _ in 0..15 {
        rig.step();
    }
    rig.command(PumpCommand::Stop).unwrap();
    rig.step();
    assert_eq!(rig.snap().current_level, 72);
    for _ in 0..24 {
        rig.step();
    }
    assert_eq!(rig.snap().current_level, 0);
    assert_eq!(rig.snap().status, PumpStatus::Idle);
    assert_eq!(rig.snap().power, 0.0);
    assert_eq!(rig.snap().flow, 0.0);
}

// ── Alarms ────────────────────────────────────────────────────

#[test]
fn filter_clogged_wins_over_low_oil() {
    let mut rig = Rig::new();
    rig.stage(|s| {
        s.filter_state = 10.0;
        s.oil_level = 10.0;
    });
    rig.step();

    assert_eq!(rig.app.controller().alarm().kind, Some(AlarmKind::FilterClogged));
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::AlarmRaised(AlarmKind::FilterClogged))),
        1
    );
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmRaised(_))), 1);
    assert_eq!(rig.snap().active_alarm, 1);
    assert_eq!(rig.app.controller().target_level(), 0);
    // Status is derived before the triggers run.
    assert_eq!(rig.snap().status, PumpStatus::Running);

    rig.step();
    assert_eq!(rig.snap().status, PumpStatus::Alarm);
    assert_eq!(rig.app.build_telemetry().alarm_kind, Some(AlarmKind::FilterClogged));
}

#[test]
fn scripted_draw_raises_power_failure() {
    let mut rig = Rig::with_rng(ScriptedRng::with_units(&[0.0, 0.999]));
    rig.step();
    assert_eq!(rig.app.controller().alarm().kind, Some(AlarmKind::PowerFailure));
}

#[test]
fn scripted_draw_raises_leakage() {
    let mut rig = Rig::with_rng(ScriptedRng::with_units(&[0.999, 0.0]));
    rig.step();
    assert_eq!(rig.app.controller().alarm().kind, Some(AlarmKind::Leakage));
}

#[test]
fn auto_reset_clears_after_configured_dwell() {
    let mut rig = Rig::new();
    assert_eq!(
        rig.command(PumpCommand::SetAutoResetMinutes(-1.0)),
        Err(CommandError::InvalidAutoResetMinutes(-1.0))
    );
    assert_eq!(rig.app.controller().auto_reset_minutes(), 3.0);
    assert_eq!(
        rig.command(PumpCommand::SetAutoResetMinutes(5.0)),
        Ok(CommandOutcome::Applied)
    );

    rig.stage(|s| s.filter_state = 10.0);
    rig.tick_at(100.0);
    assert!(rig.app.controller().in_alarm());
    assert_eq!(rig.snap().alarm_time_remaining, 300.0);

    rig.tick_at(399.0);
    assert!(rig.app.controller().in_alarm());
    assert_eq!(rig.snap().alarm_time_remaining, 1.0);

    rig.tick_at(400.0);
    assert!(!rig.app.controller().in_alarm());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmCleared)), 1);
    assert_eq!(rig.app.controller().target_level(), 75);
    assert_eq!(rig.snap().alarm_time_remaining, 0.0);
    assert_eq!(rig.snap().active_alarm, 0);
    assert!(rig.snap().filter_state > 99.9);

    rig.tick_at(402.0);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmCleared)), 1);
}

// ── Maintenance ───────────────────────────────────────────────

#[test]
fn reset_filter_applies_once_on_next_tick() {
    let mut rig = Rig::new();
    rig.command(PumpCommand::Stop).unwrap();
    rig.stage(|s| s.filter_state = 10.0);
    rig.command(PumpCommand::ResetFilter).unwrap();
    assert_eq!(rig.app.controller().last_command(), "resetFilter");

    rig.step();
    assert_eq!(rig.snap().filter_state, 100.0);
    assert_eq!(rig.app.controller().last_command(), "None");
    assert!(!rig.app.controller().in_alarm());

    rig.stage(|s| s.filter_state = 50.0);
    rig.step();
    assert_eq!(rig.snap().filter_state, 50.0, "reset must not repeat");
}

#[test]
fn change_oil_refills_on_next_tick() {
    let mut rig = Rig::new();
    rig.command(PumpCommand::Stop).unwrap();
    rig.stage(|s| s.oil_level = 40.0);
    rig.command(PumpCommand::ChangeOil).unwrap();
    rig.step();
    assert_eq!(rig.snap().oil_level, 100.0);
    assert_eq!(rig.app.controller().last_command(), "None");
}

// ── Wear ──────────────────────────────────────────────────────

#[test]
fn filter_wears_monotonically_over_sixty_ticks() {
    let mut rig = Rig::new();
    let mut prev = rig.snap().filter_state;
    for _ in 0..60 {
        rig.step();
        let f = rig.snap().filter_state;
        assert!(f <= prev);
        assert!(f >= 0.0);
        prev = f;
    }
    assert_eq!(rig.snap().current_level, 75);
    assert!(prev < 100.0);
    assert!(!rig.app.controller().in_alarm());
}

#[test]
fn full_load_wear_clogs_in_thirty_minutes() {
    let mut rig = Rig::new();
    rig.command(PumpCommand::SetOperatingLevel(100)).unwrap();
    for _ in 0..20 {
        rig.step();
    }
    assert_eq!(rig.snap().current_level, 100);

    let before = rig.snap().filter_state;
    for _ in 0..10 {
        rig.step();
    }
    let per_sec = (before - rig.snap().filter_state) / 20.0;
    assert!((100.0 / per_sec - 1800.0).abs() < 1e-6);
}

#[test]
fn zero_minutes_to_clog_rejected_and_estimate_kept() {
    let mut rig = Rig::new();
    let before = rig.app.controller().degradation();
    assert!(rig.command(PumpCommand::SetFilterDegradationRate(0.0)).is_err());
    assert_eq!(rig.app.controller().degradation(), before);
    rig.step();
    assert_eq!(rig.snap().degradation_estimate_minutes, 30);

    rig.command(PumpCommand::SetFilterDegradationRate(10.0)).unwrap();
    rig.step();
    assert_eq!(rig.snap().degradation_estimate_minutes, 10);
}

#[test]
fn run_hours_accrue_twelve_times_wall_clock() {
    let mut rig = Rig::new();
    rig.step();
    let expected = 2.0 / 3600.0 * 12.0;
    assert!((rig.snap().run_hours - expected).abs() < 1e-12);
}

// ── Cadence ───────────────────────────────────────────────────

#[test]
fn update_interval_change_emits_event_and_sets_dt() {
    let mut rig = Rig::new();
    assert!(rig.command(PumpCommand::SetUpdateInterval(0.05)).is_err());
    assert_eq!(rig.app.update_interval_secs(), 2.0);

    rig.command(PumpCommand::SetUpdateInterval(5.0)).unwrap();
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::IntervalChanged(s) if *s == 5.0)),
        1
    );
    rig.step();
    let expected = 5.0 / 3600.0 * 12.0;
    assert!((rig.snap().run_hours - expected).abs() < 1e-12);
    assert_eq!(rig.app.build_telemetry().update_interval_secs, 5.0);
}

#[test]
fn every_tick_emits_telemetry() {
    let mut rig = Rig::new();
    rig.sink.clear();
    for _ in 0..5 {
        rig.step();
    }
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 5);
    assert_eq!(rig.app.tick_count(), 5);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::StatusChanged {
                from: PumpStatus::Idle,
                to: PumpStatus::Running
            }
        )),
        1
    );
}
