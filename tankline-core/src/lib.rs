//! Core dataflow engine for Tankline
//!
//! Samples sensors on a fixed schedule and pushes each reading through a
//! small tree of transforms into telemetry sinks.
//! Designed for edge devices with limited resources.
//!
//! Key constraints:
//! - Single-threaded, cooperative: one call stack drives every tick
//! - No heap allocation in the tick path (graphs are allocated once at startup)
//! - No locks, atomics or async boundaries
//!
//! ```no_run
//! use tankline_core::{
//!     Application, Chain, FailurePolicy, FixedTime, Linear, MovingAverage, Node,
//!     NullOutput, Producer, Sink, Value, ValueKind,
//! };
//!
//! let chain = Chain::new()
//!     .then(Node::linear(Linear::new(0.1, 0.0)))
//!     .then(Node::moving_average(MovingAverage::new(10, 1.0)?))
//!     .then(Node::sink(Sink::new("tanks.fuel.currentLevel", ValueKind::Float)?))
//!     .build()?;
//!
//! let level = Producer::float("level", || Ok(512.0))
//!     .with_failure_policy(FailurePolicy::Sentinel(Value::Float(-1.0)))
//!     .connect(chain)?;
//!
//! let clock = FixedTime::new(0);
//! let mut app = Application::new(&clock, NullOutput);
//! app.register(level, 2000)?;
//!
//! loop {
//!     app.tick();
//! }
//! # Ok::<(), tankline_core::SchedulerError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod logging;

pub mod app;
pub mod buffer;
pub mod config;
pub mod constants;
pub mod errors;
pub mod graph;
pub mod output;
pub mod producer;
pub mod scheduler;
pub mod time;
pub mod transforms;
pub mod value;

// Public API
pub use app::Application;
pub use config::{LinearCalibration, TransformConfig};
pub use errors::{
    ConfigError, GraphError, GraphResult, OutputError, SchedulerError, SensorFault, SensorResult,
};
pub use graph::{Chain, Node, Sink};
pub use output::{NullOutput, TelemetryOutput};
pub use producer::{FailurePolicy, Producer, ProducerStats, ReadingSource};
pub use scheduler::{ProducerId, Scheduler};
pub use time::{FixedTime, TimeSource, Timestamp};
#[cfg(feature = "std")]
pub use time::MonotonicTime;
pub use transforms::{Lambda, Linear, MovingAverage};
pub use value::{Path, Value, ValueKind, ValueType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
