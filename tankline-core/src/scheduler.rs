//! Cooperative Scheduler
//!
//! ## Timing
//!
//! The scheduler has no clock of its own. The caller passes `now` into every
//! [`Scheduler::tick`], normally once per main-loop iteration.
//!
//! - A producer is armed on the first tick that sees it:
//!   `next_due = now + period`. It does not fire on that tick.
//! - On a later tick with `next_due <= now` it fires once and
//!   `next_due = now + period`. Lateness is not made up.
//! - Due producers fire in registration order.
//!
//! ```text
//! period 2000 ms
//!
//! tick   0 ── arm (due 2000)
//! tick 1999 ── -
//! tick 2000 ── fire (due 4000)
//! tick 2001 ── -
//! ```
//!
//! ## Freezing
//!
//! The first tick freezes the producer table. Registration after that fails
//! with [`SchedulerError::Frozen`]; graphs can only be reconfigured by path.

use heapless::Vec;

use crate::config::TransformConfig;
use crate::constants::buffers::MAX_PRODUCERS;
use crate::errors::{GraphError, SchedulerError};
use crate::graph::{Node, PathSet};
use crate::output::TelemetryOutput;
use crate::producer::Producer;
use crate::time::Timestamp;

/// Handle returned by [`Scheduler::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProducerId(usize);

impl ProducerId {
    /// Registration index
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Entry {
    producer: Producer,
    period_ms: u32,
    next_due: Option<Timestamp>,
}

/// Fixed-capacity table of producers and their due times
#[derive(Debug, Default)]
pub struct Scheduler {
    entries: Vec<Entry, MAX_PRODUCERS>,
    paths: PathSet,
    frozen: bool,
}

impl Scheduler {
    /// Empty, unfrozen scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a producer that fires every `period_ms`
    ///
    /// The producer's graph is type-checked and its paths are checked
    /// against every graph registered before it. On error nothing is
    /// registered.
    pub fn register(
        &mut self,
        producer: Producer,
        period_ms: u32,
    ) -> Result<ProducerId, SchedulerError> {
        if self.frozen {
            return Err(SchedulerError::Frozen);
        }
        if period_ms == 0 {
            return Err(SchedulerError::InvalidPeriod);
        }
        if self.entries.is_full() {
            return Err(SchedulerError::CapacityExceeded { max: MAX_PRODUCERS });
        }

        let mut paths = self.paths.clone();
        producer.validate(&mut paths)?;

        let id = ProducerId(self.entries.len());
        log_info!("Registered {} every {} ms", producer.name(), period_ms);

        self.entries
            .push(Entry { producer, period_ms, next_due: None })
            .map_err(|_| SchedulerError::CapacityExceeded { max: MAX_PRODUCERS })?;
        self.paths = paths;

        Ok(id)
    }

    /// Fire every due producer; returns how many fired
    pub fn tick(&mut self, now: Timestamp, out: &mut dyn TelemetryOutput) -> usize {
        if !self.frozen {
            self.frozen = true;
            log_debug!("Scheduler frozen with {} producers", self.entries.len());
        }

        let mut fired = 0;
        for entry in self.entries.iter_mut() {
            let period = u64::from(entry.period_ms);
            match entry.next_due {
                None => entry.next_due = Some(now.saturating_add(period)),
                Some(due) if due <= now => {
                    entry.producer.fire(out);
                    entry.next_due = Some(now.saturating_add(period));
                    fired += 1;
                }
                Some(_) => {}
            }
        }

        fired
    }

    /// Milliseconds until the earliest producer is due
    ///
    /// Zero if something is due now or still unarmed, `None` if nothing is
    /// registered. Lets a hosted main loop sleep instead of spinning.
    pub fn until_next_due(&self, now: Timestamp) -> Option<u64> {
        self.entries
            .iter()
            .map(|entry| entry.next_due.map_or(0, |due| due.saturating_sub(now)))
            .min()
    }

    /// When `id` fires next; `None` before its first tick
    pub fn next_due(&self, id: ProducerId) -> Option<Timestamp> {
        self.entries.get(id.0).and_then(|entry| entry.next_due)
    }

    /// Registered producer
    pub fn producer(&self, id: ProducerId) -> Option<&Producer> {
        self.entries.get(id.0).map(|entry| &entry.producer)
    }

    /// Registered producers, in registration order
    pub fn producers(&self) -> impl Iterator<Item = &Producer> {
        self.entries.iter().map(|entry| &entry.producer)
    }

    /// Find a node by path across all graphs
    pub fn find_node_mut(&mut self, path: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find_map(|entry| entry.producer.find_mut(path))
    }

    /// Apply `config` to the node at `path`
    ///
    /// Safe between ticks; never rewires the graph.
    pub fn configure(&mut self, path: &str, config: TransformConfig) -> Result<(), SchedulerError> {
        config.validate()?;

        let node = self.find_node_mut(path).ok_or(GraphError::UnknownPath)?;
        node.configure(config)?;
        Ok(())
    }

    /// Number of registered producers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once the first tick has run
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SensorResult;
    use crate::graph::{Chain, Sink};
    use crate::output::NullOutput;
    use crate::transforms::{Linear, MovingAverage};
    use crate::value::{Value, ValueKind};
    use core::cell::Cell;
    use std::rc::Rc;

    fn counting(name: &'static str, polls: Rc<Cell<u32>>) -> Producer {
        Producer::float(name, move || -> SensorResult<f32> {
            polls.set(polls.get() + 1);
            Ok(1.0)
        })
    }

    #[test]
    fn fires_once_per_period() {
        const P: u64 = 2000;
        let polls = Rc::new(Cell::new(0));
        let mut scheduler = Scheduler::new();
        let id = scheduler.register(counting("level", polls.clone()), P as u32).unwrap();

        for now in [0, P - 1, P, P + 1] {
            scheduler.tick(now, &mut NullOutput);
        }

        assert_eq!(polls.get(), 1);
        assert_eq!(scheduler.next_due(id), Some(2 * P));
    }

    #[test]
    fn late_tick_fires_once_and_reschedules_from_now() {
        let polls = Rc::new(Cell::new(0));
        let mut scheduler = Scheduler::new();
        let id = scheduler.register(counting("level", polls.clone()), 100).unwrap();

        scheduler.tick(0, &mut NullOutput);
        assert_eq!(scheduler.tick(350, &mut NullOutput), 1);

        assert_eq!(polls.get(), 1);
        assert_eq!(scheduler.next_due(id), Some(450));
    }

    #[test]
    fn due_producers_fire_in_registration_order() {
        let order = Rc::new(core::cell::RefCell::new(std::vec::Vec::new()));
        let mut scheduler = Scheduler::new();

        for name in ["first", "second", "third"] {
            let order = order.clone();
            let producer = Producer::int(name, move || {
                order.borrow_mut().push(name);
                Ok(0)
            });
            scheduler.register(producer, 10).unwrap();
        }

        scheduler.tick(0, &mut NullOutput);
        assert_eq!(scheduler.tick(10, &mut NullOutput), 3);
        assert_eq!(*order.borrow(), ["first", "second", "third"]);
    }

    #[test]
    fn independent_periods() {
        let fast = Rc::new(Cell::new(0));
        let slow = Rc::new(Cell::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register(counting("fast", fast.clone()), 100).unwrap();
        scheduler.register(counting("slow", slow.clone()), 1000).unwrap();

        for now in (0..=2000).step_by(50) {
            scheduler.tick(now, &mut NullOutput);
        }

        assert_eq!(fast.get(), 20);
        assert_eq!(slow.get(), 2);
    }

    #[test]
    fn frozen_after_first_tick() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Producer::float("a", || Ok(0.0)), 10).unwrap();
        assert!(!scheduler.is_frozen());

        scheduler.tick(0, &mut NullOutput);

        assert!(scheduler.is_frozen());
        assert_eq!(
            scheduler.register(Producer::float("b", || Ok(0.0)), 10),
            Err(SchedulerError::Frozen)
        );
    }

    #[test]
    fn rejects_bad_registrations() {
        let mut scheduler = Scheduler::new();
        assert_eq!(
            scheduler.register(Producer::float("a", || Ok(0.0)), 0),
            Err(SchedulerError::InvalidPeriod)
        );

        for _ in 0..MAX_PRODUCERS {
            scheduler.register(Producer::float("a", || Ok(0.0)), 10).unwrap();
        }
        assert_eq!(
            scheduler.register(Producer::float("a", || Ok(0.0)), 10),
            Err(SchedulerError::CapacityExceeded { max: MAX_PRODUCERS })
        );
    }

    #[test]
    fn paths_are_unique_across_producers() {
        let mut scheduler = Scheduler::new();
        let level = |name| {
            Producer::float(name, || Ok(0.0))
                .connect(Node::sink(Sink::float("tanks.fuel.currentLevel").unwrap()))
                .unwrap()
        };

        scheduler.register(level("a"), 10).unwrap();
        assert_eq!(
            scheduler.register(level("b"), 10),
            Err(SchedulerError::Graph(GraphError::DuplicatePath))
        );
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn configure_by_path() {
        let chain = Chain::new()
            .then(Node::linear(Linear::identity()).with_path("/level/linear").unwrap())
            .then(
                Node::moving_average(MovingAverage::new(4, 1.0).unwrap())
                    .with_path("/level/samples")
                    .unwrap(),
            )
            .then(Node::sink(Sink::new("level", ValueKind::Float).unwrap()))
            .build()
            .unwrap();

        let mut scheduler = Scheduler::new();
        scheduler
            .register(Producer::float("level", || Ok(10.0)).connect(chain).unwrap(), 10)
            .unwrap();

        scheduler
            .configure("/level/linear", TransformConfig::Linear { multiplier: 2.0, offset: 0.0 })
            .unwrap();
        assert_eq!(
            scheduler.configure("/nowhere", TransformConfig::Linear { multiplier: 1.0, offset: 0.0 }),
            Err(SchedulerError::Graph(GraphError::UnknownPath))
        );
        assert!(matches!(
            scheduler.configure("/level/samples", TransformConfig::MovingAverage { window: 0, scale: 1.0 }),
            Err(SchedulerError::Config(_))
        ));
    }

    #[test]
    fn sleep_hint() {
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.until_next_due(0), None);

        scheduler.register(Producer::float("a", || Ok(0.0)), 500).unwrap();
        scheduler.register(Producer::float("b", || Ok(0.0)), 200).unwrap();
        assert_eq!(scheduler.until_next_due(0), Some(0));

        scheduler.tick(0, &mut NullOutput);
        assert_eq!(scheduler.until_next_due(50), Some(150));
        assert_eq!(scheduler.until_next_due(300), Some(0));
    }

    #[test]
    fn fired_value_reaches_output() {
        struct Last(Option<Value>);
        impl TelemetryOutput for Last {
            fn send(&mut self, _: &str, value: Value) -> Result<(), crate::errors::OutputError> {
                self.0 = Some(value);
                Ok(())
            }
        }

        let mut scheduler = Scheduler::new();
        scheduler
            .register(
                Producer::float("level", || Ok(7.0))
                    .connect(Node::sink(Sink::float("out").unwrap()))
                    .unwrap(),
                10,
            )
            .unwrap();

        let mut out = Last(None);
        scheduler.tick(0, &mut out);
        scheduler.tick(10, &mut out);
        assert_eq!(out.0, Some(Value::Float(7.0)));
    }
}
