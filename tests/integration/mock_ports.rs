//! Scripted port adapters for integration tests.
//!
//! `ScriptedRng` makes every tick deterministic, `ManualClock` lets a
//! test jump the clock, and `RecordingSink` keeps every emitted event.

use std::cell::Cell;
use std::collections::VecDeque;

use pumpsim::app::events::AppEvent;
use pumpsim::app::ports::{EventSink, RandomSource, TimePort};

// ── Random source ─────────────────────────────────────────────

/// Largest ramp step, centred jitter, and probability draws that never
/// fire unless queued.
pub struct ScriptedRng {
    pub units: VecDeque<f64>,
}

#[allow(dead_code)]
impl ScriptedRng {
    pub fn new() -> Self {
        Self {
            units: VecDeque::new(),
        }
    }

    /// Queue probability draws, consumed in order before falling back
    /// to `0.999`.
    pub fn with_units(units: &[f64]) -> Self {
        Self {
            units: units.iter().copied().collect(),
        }
    }
}

impl RandomSource for ScriptedRng {
    fn int_inclusive(&mut self, _lo: u8, hi: u8) -> u8 {
        hi
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        (lo + hi) / 2.0
    }

    fn unit(&mut self) -> f64 {
        self.units.pop_front().unwrap_or(0.999)
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub struct ManualClock {
    now: Cell<f64>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(secs: f64) -> Self {
        Self {
            now: Cell::new(secs),
        }
    }

    pub fn set(&self, secs: f64) {
        self.now.set(secs);
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

impl TimePort for ManualClock {
    fn now_secs(&self) -> f64 {
        self.now.get()
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
