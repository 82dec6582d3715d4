//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the pump controller, the simulation engine and the
//! tick cadence.  Randomness, time and event output flow through port
//! traits injected at call sites, so the whole service runs against
//! scripted adapters in tests.
//!
//! ```text
//!  RandomSource ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                   │        AppService         │
//!      TimePort ──▶ │  Controller · Engine      │
//!                   └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::{PumpConfig, interval_in_range};
use crate::control::PumpController;
use crate::error::CommandError;
use crate::sim::{SimulationEngine, Snapshot};

use super::commands::{CommandOutcome, PumpCommand};
use super::events::{AppEvent, TelemetryData};
use super::ports::{EventSink, RandomSource, TimePort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    controller: PumpController,
    engine: SimulationEngine,
    /// Seconds between ticks; also the `dt` of each tick.
    update_interval_secs: f64,
    tick_count: u64,
}

impl AppService {
    /// Construct the service.  `now` anchors the inflow temperature cycle.
    pub fn new(config: &PumpConfig, now: f64) -> Self {
        Self {
            controller: PumpController::new(config),
            engine: SimulationEngine::new(config, now),
            update_interval_secs: config.update_interval_secs,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the initial state.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started(self.build_telemetry()));
        info!(
            "AppService started, update interval {} s",
            self.update_interval_secs
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one tick of `update_interval_secs` at the clock's current time.
    pub fn tick(
        &mut self,
        rng: &mut impl RandomSource,
        clock: &impl TimePort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let now = clock.now_secs();
        let prev_status = self.engine.snapshot().status;

        let report = self
            .engine
            .tick(&mut self.controller, self.update_interval_secs, now, rng);

        if report.auto_reset {
            sink.emit(&AppEvent::AlarmCleared);
        }
        if let Some(kind) = report.raised {
            warn!("Alarm raised: {kind}");
            sink.emit(&AppEvent::AlarmRaised(kind));
        }

        let status = self.engine.snapshot().status;
        if status != prev_status {
            sink.emit(&AppEvent::StatusChanged {
                from: prev_status,
                to: status,
            });
        }

        sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply an operator command between ticks.
    pub fn handle_command(
        &mut self,
        cmd: PumpCommand,
        sink: &mut impl EventSink,
    ) -> Result<CommandOutcome, CommandError> {
        let c = &mut self.controller;
        match cmd {
            PumpCommand::Stop => c.stop(),
            PumpCommand::Start => c.start(),
            PumpCommand::SetOperatingLevel(level) => {
                return c.set_operating_level(level).map(CommandOutcome::Level);
            }
            PumpCommand::SetFilterDegradationRate(minutes) => {
                c.set_filter_degradation_rate(minutes)?;
            }
            PumpCommand::SetAutoResetMinutes(minutes) => c.set_auto_reset_minutes(minutes)?,
            PumpCommand::ResetFilter => c.reset_filter(),
            PumpCommand::ChangeOil => c.change_oil(),
            PumpCommand::SetUpdateInterval(secs) => {
                self.set_update_interval(secs)?;
                sink.emit(&AppEvent::IntervalChanged(secs));
            }
        }
        Ok(CommandOutcome::Applied)
    }

    /// Change the tick cadence.  Out-of-range values keep the prior interval.
    pub fn set_update_interval(&mut self, secs: f64) -> Result<(), CommandError> {
        if !interval_in_range(secs) {
            warn!("Invalid update interval: {} s", secs);
            return Err(CommandError::IntervalOutOfRange(secs));
        }
        info!("Update interval changed to {} s", secs);
        self.update_interval_secs = secs;
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Everything the presenter publishes after a tick.
    pub fn build_telemetry(&self) -> TelemetryData {
        let c = &self.controller;
        let cmd = c.command_state();
        TelemetryData {
            snapshot: *self.engine.snapshot(),
            target_level: cmd.target_level,
            last_command: cmd.last_command.clone(),
            command_success: cmd.command_success,
            alarm_kind: if c.in_alarm() { c.alarm().kind } else { None },
            auto_reset_minutes: c.auto_reset_minutes(),
            default_operating_level: c.default_operating_level(),
            update_interval_secs: self.update_interval_secs,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.engine.snapshot()
    }

    pub fn controller(&self) -> &PumpController {
        &self.controller
    }

    pub fn update_interval_secs(&self) -> f64 {
        self.update_interval_secs
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Overwrite the physical state, e.g. to stage a test scenario.
    pub fn restore_snapshot(&mut self, snapshot: Snapshot) {
        self.engine.restore(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::AlarmKind;
    use crate::sim::PumpStatus;

    struct Calm;

    impl RandomSource for Calm {
        fn int_inclusive(&mut self, lo: u8, _hi: u8) -> u8 {
            lo
        }
        fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
            if lo == 0.0 && hi == 1.0 { 0.999 } else { (lo + hi) / 2.0 }
        }
    }

    struct At(f64);

    impl TimePort for At {
        fn now_secs(&self) -> f64 {
            self.0
        }
    }

    #[derive(Default)]
    struct Collect(Vec<AppEvent>);

    impl EventSink for Collect {
        fn emit(&mut self, event: &AppEvent) {
            self.0.push(event.clone());
        }
    }

    fn service() -> AppService {
        AppService::new(&PumpConfig::default(), 0.0)
    }

    #[test]
    fn start_emits_initial_telemetry() {
        let mut svc = service();
        let mut sink = Collect::default();
        svc.start(&mut sink);
        match &sink.0[..] {
            [AppEvent::Started(t)] => {
                assert_eq!(t.snapshot.current_level, 0);
                assert_eq!(t.target_level, 75);
                assert_eq!(t.last_command, "None");
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn first_tick_reports_status_change() {
        let mut svc = service();
        let mut sink = Collect::default();
        svc.tick(&mut Calm, &At(2.0), &mut sink);
        assert!(matches!(
            sink.0[0],
            AppEvent::StatusChanged {
                from: PumpStatus::Idle,
                to: PumpStatus::Running
            }
        ));
        assert!(matches!(sink.0.last(), Some(AppEvent::Telemetry(_))));
        assert_eq!(svc.tick_count(), 1);
    }

    #[test]
    fn commands_map_to_outcomes() {
        let mut svc = service();
        let mut sink = Collect::default();
        assert_eq!(
            svc.handle_command(PumpCommand::SetOperatingLevel(40), &mut sink),
            Ok(CommandOutcome::Level(40))
        );
        assert_eq!(
            svc.handle_command(PumpCommand::SetOperatingLevel(140), &mut sink),
            Err(CommandError::LevelOutOfRange(140))
        );
        assert_eq!(svc.controller().target_level(), 40);
        assert_eq!(
            svc.handle_command(PumpCommand::Stop, &mut sink),
            Ok(CommandOutcome::Applied)
        );
        assert!(svc
            .handle_command(PumpCommand::SetAutoResetMinutes(-1.0), &mut sink)
            .is_err());
        assert!(sink.0.is_empty());
    }

    #[test]
    fn update_interval_is_range_checked() {
        let mut svc = service();
        let mut sink = Collect::default();
        assert!(svc
            .handle_command(PumpCommand::SetUpdateInterval(0.05), &mut sink)
            .is_err());
        assert_eq!(svc.update_interval_secs(), 2.0);
        svc.handle_command(PumpCommand::SetUpdateInterval(0.5), &mut sink)
            .unwrap();
        assert_eq!(svc.update_interval_secs(), 0.5);
        assert!(matches!(sink.0[..], [AppEvent::IntervalChanged(s)] if s == 0.5));
    }

    #[test]
    fn alarm_and_reset_are_reported() {
        let mut svc = service();
        let mut s = *svc.snapshot();
        s.oil_level = 10.0;
        svc.restore_snapshot(s);

        let mut sink = Collect::default();
        svc.tick(&mut Calm, &At(0.0), &mut sink);
        assert!(sink
            .0
            .iter()
            .any(|e| matches!(e, AppEvent::AlarmRaised(AlarmKind::OilLow))));
        assert_eq!(svc.build_telemetry().alarm_kind, Some(AlarmKind::OilLow));

        svc.handle_command(PumpCommand::ChangeOil, &mut sink).unwrap();
        let mut sink = Collect::default();
        svc.tick(&mut Calm, &At(180.0), &mut sink);
        assert!(sink.0.iter().any(|e| matches!(e, AppEvent::AlarmCleared)));
        assert_eq!(svc.build_telemetry().alarm_kind, None);
    }
}
