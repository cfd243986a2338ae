//! Shared helpers for the integration tests
//!
//! - [`RecordingOutput`]: telemetry output that keeps every `(path, value)`
//! - [`ScriptedSensor`]: sensor callback replaying a fixed list of results

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use tankline_core::{OutputError, SensorFault, SensorResult, TelemetryOutput, Value};

/// Everything the sinks published, in order
#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub sent: Vec<(String, Value)>,
    /// Reject every send once this many values were accepted
    pub fail_after: Option<usize>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values published under `path`
    pub fn values(&self, path: &str) -> Vec<Value> {
        self.sent
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Float values published under `path`
    pub fn floats(&self, path: &str) -> Vec<f32> {
        self.values(path).iter().filter_map(Value::as_f32).collect()
    }

    /// Last value published under `path`
    pub fn last(&self, path: &str) -> Option<Value> {
        self.values(path).last().copied()
    }
}

impl TelemetryOutput for RecordingOutput {
    fn send(&mut self, path: &str, value: Value) -> Result<(), OutputError> {
        if self.fail_after.map_or(false, |limit| self.sent.len() >= limit) {
            return Err(OutputError::Unavailable);
        }
        self.sent.push((path.to_string(), value));
        Ok(())
    }
}

/// Replays scripted readings; repeats the last one when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedSensor<T: Copy> {
    script: Rc<RefCell<Script<T>>>,
}

#[derive(Debug)]
struct Script<T> {
    readings: Vec<SensorResult<T>>,
    next: usize,
    polls: usize,
}

impl<T: Copy + 'static> ScriptedSensor<T> {
    pub fn new(readings: Vec<SensorResult<T>>) -> Self {
        assert!(!readings.is_empty(), "script needs at least one reading");
        Self {
            script: Rc::new(RefCell::new(Script { readings, next: 0, polls: 0 })),
        }
    }

    /// Every reading succeeds
    pub fn ok(readings: &[T]) -> Self {
        Self::new(readings.iter().copied().map(Ok).collect())
    }

    /// Callback to hand to a producer; shares state with `self`
    pub fn callback(&self) -> impl FnMut() -> SensorResult<T> + 'static {
        let script = Rc::clone(&self.script);
        move || {
            let mut script = script.borrow_mut();
            let index = script.next.min(script.readings.len() - 1);
            script.next += 1;
            script.polls += 1;
            script.readings[index]
        }
    }

    /// How often the callback ran
    pub fn polls(&self) -> usize {
        self.script.borrow().polls
    }
}

/// Shorthand for a failed reading
pub fn fault<T>() -> SensorResult<T> {
    Err(SensorFault::NoSignal)
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}
