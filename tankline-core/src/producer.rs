//! Scheduled sources
//!
//! A [`Producer`] wraps a sensor callback. Each time the scheduler finds it
//! due, it polls the callback once and pushes exactly one value into its
//! downstream nodes: the reading on success, or whatever its
//! [`FailurePolicy`] says on failure. Faults never travel further than the
//! producer.

use alloc::boxed::Box;
use core::fmt;

use heapless::Vec;

use crate::constants::buffers::MAX_FANOUT;
use crate::errors::{GraphError, GraphResult, SensorFault, SensorResult};
use crate::graph::{forward, Downstream, Node, PathSet};
use crate::output::TelemetryOutput;
use crate::value::{Value, ValueKind, ValueType};

/// Something that can be asked for a reading
///
/// Implemented for every `FnMut() -> SensorResult<Value>`, so a closure over
/// a driver handle is usually enough.
pub trait ReadingSource {
    /// Take one reading
    fn read(&mut self) -> SensorResult<Value>;
}

impl<F> ReadingSource for F
where
    F: FnMut() -> SensorResult<Value>,
{
    fn read(&mut self) -> SensorResult<Value> {
        self()
    }
}

/// What a producer emits when its source fails
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailurePolicy {
    /// Emit this fixed placeholder
    Sentinel(Value),
    /// Repeat the last successful reading; `fallback` until there is one
    LastKnownGood {
        /// Emitted before the first successful reading
        fallback: Value,
    },
}

impl FailurePolicy {
    /// Default placeholder for `kind`: NaN, 0 or false
    pub const fn default_for(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Float => FailurePolicy::Sentinel(Value::Float(f32::NAN)),
            ValueKind::Int => FailurePolicy::Sentinel(Value::Int(0)),
            ValueKind::Bool => FailurePolicy::Sentinel(Value::Bool(false)),
        }
    }

    /// Value to emit given the last good reading
    pub fn resolve(&self, last_good: Option<Value>) -> Value {
        match *self {
            FailurePolicy::Sentinel(value) => value,
            FailurePolicy::LastKnownGood { fallback } => last_good.unwrap_or(fallback),
        }
    }

    /// The fixed value this policy may fall back to
    pub fn placeholder(&self) -> Value {
        match *self {
            FailurePolicy::Sentinel(value) => value,
            FailurePolicy::LastKnownGood { fallback } => fallback,
        }
    }
}

/// Poll counters for one producer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProducerStats {
    /// Scheduled invocations
    pub polls: u32,
    /// Invocations whose source failed
    pub failures: u32,
    /// Failures since the last success
    pub consecutive_failures: u32,
    /// Most recent fault, kept after recovery
    pub last_fault: Option<SensorFault>,
}

/// A scheduled source and the graph it feeds
pub struct Producer {
    name: &'static str,
    kind: ValueKind,
    source: Box<dyn ReadingSource>,
    policy: FailurePolicy,
    last_good: Option<Value>,
    downstream: Downstream,
    stats: ProducerStats,
}

impl Producer {
    /// Producer emitting values of `kind` read from `source`
    pub fn new<S>(name: &'static str, kind: ValueKind, source: S) -> Self
    where
        S: ReadingSource + 'static,
    {
        Self {
            name,
            kind,
            source: Box::new(source),
            policy: FailurePolicy::default_for(kind),
            last_good: None,
            downstream: Vec::new(),
            stats: ProducerStats::default(),
        }
    }

    /// Producer over a typed callback
    pub fn typed<T, F>(name: &'static str, mut read: F) -> Self
    where
        T: ValueType,
        F: FnMut() -> SensorResult<T> + 'static,
    {
        Self::new(name, T::KIND, move || read().map(T::into_value))
    }

    /// Float producer, for distances and levels
    pub fn float<F>(name: &'static str, read: F) -> Self
    where
        F: FnMut() -> SensorResult<f32> + 'static,
    {
        Self::typed(name, read)
    }

    /// Integer producer, for status codes and counters
    pub fn int<F>(name: &'static str, read: F) -> Self
    where
        F: FnMut() -> SensorResult<i32> + 'static,
    {
        Self::typed(name, read)
    }

    /// Replace the failure policy
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Append `node` to the downstream list
    pub fn connect(mut self, node: Node) -> GraphResult<Self> {
        self.downstream
            .push(Box::new(node))
            .map_err(|_| GraphError::FanoutExceeded { max: MAX_FANOUT })?;
        Ok(self)
    }

    /// Ask the source for a reading of the declared kind
    pub fn poll(&mut self) -> SensorResult<Value> {
        let reading = self.source.read()?;
        reading.coerce(self.kind).ok_or(SensorFault::Other {
            reason: "reading has the wrong kind",
        })
    }

    /// One scheduled invocation: poll, then emit exactly one value
    pub fn fire(&mut self, out: &mut dyn TelemetryOutput) -> Value {
        self.stats.polls = self.stats.polls.wrapping_add(1);

        let value = match self.poll() {
            Ok(value) => {
                self.last_good = Some(value);
                self.stats.consecutive_failures = 0;
                value
            }
            Err(fault) => {
                self.stats.failures = self.stats.failures.wrapping_add(1);
                self.stats.consecutive_failures = self.stats.consecutive_failures.saturating_add(1);
                self.stats.last_fault = Some(fault);

                let value = self.policy.resolve(self.last_good);
                log_warn!("{} failed ({}), emitting {}", self.name, fault, value);
                value
            }
        };

        forward(&mut self.downstream, value, out);
        value
    }

    /// Type-check the graph and claim its paths
    pub(crate) fn validate(&self, seen: &mut PathSet) -> GraphResult<()> {
        let placeholder = self.policy.placeholder();
        if placeholder.coerce(self.kind).is_none() {
            return Err(GraphError::TypeMismatch {
                node: "producer",
                expected: self.kind,
                found: placeholder.kind(),
            });
        }

        for node in self.downstream() {
            node.validate(self.kind, seen)?;
        }

        log_debug!("{}: graph valid", self.name);
        Ok(())
    }

    /// Find a downstream node by path
    pub fn find_mut(&mut self, path: &str) -> Option<&mut Node> {
        self.downstream
            .iter_mut()
            .find_map(|node| node.find_mut(path))
    }

    /// Name used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared output kind
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Current failure policy
    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Last successful reading
    pub fn last_good(&self) -> Option<Value> {
        self.last_good
    }

    /// Poll counters
    pub fn stats(&self) -> ProducerStats {
        self.stats
    }

    /// Directly connected nodes, in connection order
    pub fn downstream(&self) -> impl Iterator<Item = &Node> {
        self.downstream.iter().map(|node| &**node)
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("policy", &self.policy)
            .field("downstream", &self.downstream)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::OutputError;
    use crate::graph::Sink;

    #[derive(Default)]
    struct Recorder(std::vec::Vec<Value>);

    impl TelemetryOutput for Recorder {
        fn send(&mut self, _path: &str, value: Value) -> Result<(), OutputError> {
            self.0.push(value);
            Ok(())
        }
    }

    fn scripted(readings: &'static [SensorResult<f32>]) -> impl FnMut() -> SensorResult<f32> {
        let mut next = 0;
        move || {
            let reading = readings[next % readings.len()];
            next += 1;
            reading
        }
    }

    #[test]
    fn success_is_emitted() {
        let mut producer = Producer::float("level", || Ok(512.0))
            .connect(Node::sink(Sink::float("out").unwrap()))
            .unwrap();
        let mut out = Recorder::default();

        assert_eq!(producer.fire(&mut out), Value::Float(512.0));
        assert_eq!(out.0, [Value::Float(512.0)]);
        assert_eq!(producer.last_good(), Some(Value::Float(512.0)));
    }

    #[test]
    fn failure_emits_sentinel_exactly_once() {
        let mut producer = Producer::float("level", || Err(SensorFault::NoSignal))
            .with_failure_policy(FailurePolicy::Sentinel(Value::Float(-1.0)))
            .connect(Node::sink(Sink::float("out").unwrap()))
            .unwrap();
        let mut out = Recorder::default();

        producer.fire(&mut out);

        assert_eq!(out.0, [Value::Float(-1.0)]);
        let stats = producer.stats();
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.last_fault, Some(SensorFault::NoSignal));
    }

    #[test]
    fn last_known_good_repeats_previous_reading() {
        static READINGS: [SensorResult<f32>; 3] =
            [Err(SensorFault::Timeout), Ok(480.0), Err(SensorFault::Checksum)];

        let mut producer = Producer::float("level", scripted(&READINGS))
            .with_failure_policy(FailurePolicy::LastKnownGood { fallback: Value::Float(0.0) })
            .connect(Node::sink(Sink::float("out").unwrap()))
            .unwrap();
        let mut out = Recorder::default();

        for _ in 0..3 {
            producer.fire(&mut out);
        }

        assert_eq!(out.0, [Value::Float(0.0), Value::Float(480.0), Value::Float(480.0)]);
        assert_eq!(producer.stats().consecutive_failures, 1);
    }

    #[test]
    fn readings_are_coerced_to_declared_kind() {
        let mut producer = Producer::new("status", ValueKind::Int, || Ok::<_, SensorFault>(Value::Float(1.0)));
        assert_eq!(producer.poll(), Ok(Value::Int(1)));

        let mut wrong = Producer::new("status", ValueKind::Int, || {
            Ok::<_, SensorFault>(Value::Bool(true))
        });
        assert!(matches!(wrong.poll(), Err(SensorFault::Other { .. })));
    }

    #[test]
    fn sentinel_must_match_kind() {
        let producer = Producer::int("status", || Ok(1))
            .with_failure_policy(FailurePolicy::Sentinel(Value::Bool(false)));

        assert_eq!(
            producer.validate(&mut PathSet::new()),
            Err(GraphError::TypeMismatch {
                node: "producer",
                expected: ValueKind::Int,
                found: ValueKind::Bool,
            })
        );
    }

    #[test]
    fn fans_out_to_every_consumer() {
        let mut producer = Producer::float("level", || Ok(1.0))
            .connect(Node::sink(Sink::float("a").unwrap()))
            .unwrap()
            .connect(Node::sink(Sink::float("b").unwrap()))
            .unwrap();
        let mut out = Recorder::default();

        producer.fire(&mut out);
        assert_eq!(out.0.len(), 2);
    }

    #[test]
    fn default_sentinels() {
        assert!(matches!(
            FailurePolicy::default_for(ValueKind::Float).placeholder(),
            Value::Float(v) if v.is_nan()
        ));
        assert_eq!(
            FailurePolicy::default_for(ValueKind::Bool).placeholder(),
            Value::Bool(false)
        );
    }
}
