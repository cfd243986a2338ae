//! Application context
//!
//! Bundles the scheduler with the clock it reads and the output its sinks
//! write to. The application owns one of these and passes it around by
//! reference; there is no global instance.

use crate::config::TransformConfig;
use crate::errors::SchedulerError;
use crate::output::TelemetryOutput;
use crate::producer::Producer;
use crate::scheduler::{ProducerId, Scheduler};
use crate::time::TimeSource;

/// Scheduler, clock and telemetry output for one running pipeline
pub struct Application<C: TimeSource, O: TelemetryOutput> {
    scheduler: Scheduler,
    clock: C,
    output: O,
}

impl<C: TimeSource, O: TelemetryOutput> Application<C, O> {
    /// New application with an empty scheduler
    pub fn new(clock: C, output: O) -> Self {
        Self {
            scheduler: Scheduler::new(),
            clock,
            output,
        }
    }

    /// Register a producer; see [`Scheduler::register`]
    pub fn register(
        &mut self,
        producer: Producer,
        period_ms: u32,
    ) -> Result<ProducerId, SchedulerError> {
        self.scheduler.register(producer, period_ms)
    }

    /// Run one scheduler tick at the clock's current time
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        self.scheduler.tick(now, &mut self.output)
    }

    /// Milliseconds until something is due
    pub fn until_next_due(&self) -> Option<u64> {
        self.scheduler.until_next_due(self.clock.now())
    }

    /// Reconfigure the node at `path` between ticks
    pub fn configure(&mut self, path: &str, config: TransformConfig) -> Result<(), SchedulerError> {
        self.scheduler.configure(path, config)
    }

    /// The scheduler
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The telemetry output
    pub fn output(&self) -> &O {
        &self.output
    }

    /// The telemetry output, mutably (flushing, reconnecting)
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Tear down and hand back the output
    pub fn into_output(self) -> O {
        self.output
    }
}
