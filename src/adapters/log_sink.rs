//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one structured line per
//! application event through the `log` facade.  The binary routes those
//! records to `tracing-subscriber` (compact text or JSON).

use log::{info, warn};

use crate::app::events::{AppEvent, TelemetryData};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn telemetry_line(t: &TelemetryData) -> String {
    let s = &t.snapshot;
    format!(
        "status={} | level={}/{}% | flow={:.2}l/s | power={:.0}W | \
         filter={:.1}% oil={:.1}% | inflow={:.1}\u{00b0}C bearing={:.1}\u{00b0}C | \
         run={:.2}h | alarm={} remaining={:.0}s | last={}({})",
        s.status,
        s.current_level,
        t.target_level,
        s.flow,
        s.power,
        s.filter_state,
        s.oil_level,
        s.inflow_temp,
        s.bearing_temp,
        s.run_hours,
        t.alarm_kind.map_or("-", |k| k.as_str()),
        s.alarm_time_remaining,
        t.last_command,
        if t.command_success { "ok" } else { "failed" },
    )
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => info!("TELEM | {}", telemetry_line(t)),
            AppEvent::StatusChanged { from, to } => {
                info!("STATUS | {} -> {}", from, to);
            }
            AppEvent::AlarmRaised(kind) => warn!("ALARM | raised kind={}", kind),
            AppEvent::AlarmCleared => info!("ALARM | auto-reset"),
            AppEvent::IntervalChanged(secs) => info!("CONFIG | update_interval={}s", secs),
            AppEvent::Started(t) => info!("START | {}", telemetry_line(t)),
        }
    }
}
