//! Addressable point table.
//!
//! Every published value lives at `Object.name`, e.g. `Pump01.flow`.
//!
//! ```text
//!  ServerConfig ── updateInterval
//!  Pump01 ──────── simulated (refreshed every tick, writable)
//!  Pump02/Pump03 ─ static demo values (read-only)
//! ```
//!
//! Writes to simulated points are accepted but the next refresh
//! overwrites them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::app::events::TelemetryData;
use crate::error::Error;

pub const SERVER_CONFIG: &str = "ServerConfig";
pub const PUMP01: &str = "Pump01";

/// A point value as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    Int(i64),
    Double(f64),
    Bool(bool),
    Text(String),
}

impl PointValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
        }
    }

    /// Coerce `incoming` to this value's type.  Integers widen to doubles.
    fn accept(&self, incoming: PointValue) -> Option<PointValue> {
        match (self, incoming) {
            (Self::Double(_), Self::Int(i)) => Some(Self::Double(i as f64)),
            (current, v) if current.kind() == v.kind() => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for PointValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for PointValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for PointValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for PointValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

#[derive(Debug, Clone)]
struct Point {
    value: PointValue,
    writable: bool,
}

/// One `browse` result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowseEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub writable: bool,
}

/// Static demo pump values.
struct StaticPump {
    name: &'static str,
    level: i64,
    flow: f64,
    power: i64,
    run_hours: i64,
    filter: i64,
    oil: i64,
    inflow: f64,
    bearing: f64,
}

const STATIC_PUMPS: [StaticPump; 2] = [
    StaticPump {
        name: "Pump02",
        level: 85,
        flow: 4.2,
        power: 380,
        run_hours: 120,
        filter: 92,
        oil: 93,
        inflow: 21.5,
        bearing: 37.2,
    },
    StaticPump {
        name: "Pump03",
        level: 65,
        flow: 3.5,
        power: 320,
        run_hours: 250,
        filter: 78,
        oil: 85,
        inflow: 19.8,
        bearing: 39.5,
    },
];

/// Temperatures are published with one decimal.
fn one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Published values for the simulated pump, in publish order.
fn pump01_values(t: &TelemetryData) -> [(&'static str, PointValue); 17] {
    let s = &t.snapshot;
    [
        ("operatingLevel", i64::from(s.current_level).into()),
        ("status", s.status.as_str().into()),
        ("flow", s.flow.into()),
        ("activeAlarm", i64::from(s.active_alarm).into()),
        ("power", (s.power as i64).into()),
        ("runHours", (s.run_hours as i64).into()),
        ("filterState", (s.filter_state as i64).into()),
        ("oilLevel", (s.oil_level as i64).into()),
        ("inflowTemperature", one_decimal(s.inflow_temp).into()),
        ("bearingTemperature", one_decimal(s.bearing_temp).into()),
        ("alarmTimeRemaining", (s.alarm_time_remaining as i64).into()),
        ("alarmType", t.alarm_kind.map_or("", |k| k.as_str()).into()),
        ("lastCommand", t.last_command.as_str().into()),
        ("commandSuccess", t.command_success.into()),
        (
            "filterDegradationRate",
            i64::from(s.degradation_estimate_minutes).into(),
        ),
        ("autoResetMinutes", t.auto_reset_minutes.into()),
        (
            "defaultOperatingLevel",
            i64::from(t.default_operating_level).into(),
        ),
    ]
}

fn path(object: &str, name: &str) -> String {
    format!("{object}.{name}")
}

/// The address space exposed to RPC clients.
pub struct PointTable {
    points: BTreeMap<String, Point>,
}

impl PointTable {
    /// Build the table with the simulated pump at `initial`.
    pub fn new(initial: &TelemetryData) -> Self {
        let mut table = Self {
            points: BTreeMap::new(),
        };

        table.insert(
            path(SERVER_CONFIG, "updateInterval"),
            initial.update_interval_secs.into(),
            true,
        );
        for (name, value) in pump01_values(initial) {
            table.insert(path(PUMP01, name), value, true);
        }
        for p in &STATIC_PUMPS {
            let values: [(&str, PointValue); 12] = [
                ("operatingLevel", p.level.into()),
                ("status", "Running".into()),
                ("flow", p.flow.into()),
                ("activeAlarm", 0i64.into()),
                ("power", p.power.into()),
                ("runHours", p.run_hours.into()),
                ("filterState", p.filter.into()),
                ("oilLevel", p.oil.into()),
                ("inflowTemperature", p.inflow.into()),
                ("bearingTemperature", p.bearing.into()),
                ("lastCommand", "None".into()),
                ("commandSuccess", true.into()),
            ];
            for (name, value) in values {
                table.insert(path(p.name, name), value, false);
            }
        }
        table
    }

    fn insert(&mut self, path: String, value: PointValue, writable: bool) {
        self.points.insert(path, Point { value, writable });
    }

    /// Publish the latest telemetry into the simulated points.
    pub fn refresh(&mut self, t: &TelemetryData) {
        self.set(
            &path(SERVER_CONFIG, "updateInterval"),
            t.update_interval_secs.into(),
        );
        for (name, value) in pump01_values(t) {
            self.set(&path(PUMP01, name), value);
        }
    }

    fn set(&mut self, path: &str, value: PointValue) {
        if let Some(p) = self.points.get_mut(path) {
            p.value = value;
        }
    }

    pub fn read(&self, path: &str) -> Option<&PointValue> {
        self.points.get(path).map(|p| &p.value)
    }

    /// Client write.  The value must match the point's type.
    pub fn write(&mut self, path: &str, value: PointValue) -> Result<(), Error> {
        let point = self
            .points
            .get_mut(path)
            .ok_or(Error::Protocol("unknown point"))?;
        if !point.writable {
            return Err(Error::Protocol("point is read-only"));
        }
        point.value = point
            .value
            .accept(value)
            .ok_or(Error::Protocol("value type mismatch"))?;
        Ok(())
    }

    /// All points, ordered by path.
    pub fn browse(&self) -> Vec<BrowseEntry> {
        self.points
            .iter()
            .map(|(path, p)| BrowseEntry {
                path: path.clone(),
                kind: p.value.kind(),
                writable: p.writable,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
