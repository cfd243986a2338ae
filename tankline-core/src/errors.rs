//! Error Types for the Dataflow Engine
//!
//! ## Design Philosophy
//!
//! Errors are kept small and `Copy`: no heap data, only `&'static str` for
//! free-form reasons. They appear in two very different places:
//!
//! 1. **Construction time** (`GraphError`, `SchedulerError`, `ConfigError`):
//!    wiring mistakes are reported once, before the first tick.
//!
//! 2. **Run time** (`SensorFault`, `OutputError`): these never cross the
//!    producer → sink boundary as errors. A `SensorFault` is turned into a
//!    sentinel value by the producer's [`FailurePolicy`], and an
//!    `OutputError` is swallowed by the sink that received it.
//!
//! [`FailurePolicy`]: crate::producer::FailurePolicy
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use tankline_core::{Chain, GraphError, Node, Sink, ValueKind};
//!
//! let chain = Chain::new()
//!     .then(Node::sink(Sink::new("tanks.fuel.currentLevel", ValueKind::Float).unwrap()))
//!     .then(Node::sink(Sink::new("tanks.fuel.other", ValueKind::Float).unwrap()))
//!     .build();
//!
//! // Sinks are terminal
//! assert_eq!(chain.err(), Some(GraphError::SinkHasDownstream));
//! ```

use thiserror_no_std::Error;

use crate::value::ValueKind;

/// Result type for sensor callbacks
pub type SensorResult<T> = Result<T, SensorFault>;

/// Result type for graph construction
pub type GraphResult<T> = Result<T, GraphError>;

/// Failure reported by a sensor driver callback
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SensorFault {
    /// Sensor did not answer within its read timeout
    #[error("Sensor did not answer in time")]
    Timeout,

    /// Driver produced a reading it knows to be impossible
    #[error("Reading {value} outside sensor range")]
    OutOfRange {
        /// The rejected raw reading
        value: f32,
    },

    /// Sensor is powered but sees no target (no echo, no contact)
    #[error("Sensor reports no signal")]
    NoSignal,

    /// Frame received but failed its integrity check
    #[error("Frame checksum mismatch")]
    Checksum,

    /// Driver-specific failure
    #[error("Sensor fault: {reason}")]
    Other {
        /// Short static description
        reason: &'static str,
    },
}

/// Wiring errors detected while building or validating a graph
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GraphError {
    /// Paths must contain at least one byte
    #[error("Path is empty")]
    EmptyPath,

    /// Path does not fit the inline path storage
    #[error("Path of {len} bytes exceeds limit of {max}")]
    PathTooLong {
        /// Length of the rejected path
        len: usize,
        /// Inline storage capacity
        max: usize,
    },

    /// Two nodes claim the same path
    #[error("Path is used by more than one node")]
    DuplicatePath,

    /// Too many addressable paths for the scheduler's path table
    #[error("More than {max} addressable paths")]
    TooManyPaths {
        /// Path table capacity
        max: usize,
    },

    /// A node already owns the maximum number of downstream connections
    #[error("Node already has {max} downstream connections")]
    FanoutExceeded {
        /// Fan-out capacity
        max: usize,
    },

    /// Chain builder received more stages than it can hold
    #[error("Chain longer than {max} stages")]
    ChainTooLong {
        /// Chain capacity
        max: usize,
    },

    /// Chain builder received no stages
    #[error("Chain has no stages")]
    EmptyChain,

    /// Something was connected downstream of a sink
    #[error("Sinks cannot have downstream nodes")]
    SinkHasDownstream,

    /// A node cannot consume what its upstream emits
    #[error("{node} expects {expected} input but receives {found}")]
    TypeMismatch {
        /// Kind of node that rejected the input
        node: &'static str,
        /// Kind the node consumes
        expected: ValueKind,
        /// Kind its upstream emits
        found: ValueKind,
    },

    /// Moving-average window outside the supported range
    #[error("Moving average window {window} outside 1..={max}")]
    InvalidWindow {
        /// Requested window
        window: usize,
        /// Largest supported window
        max: usize,
    },

    /// No node is addressable by the requested path
    #[error("No node at the requested path")]
    UnknownPath,

    /// Configuration does not apply to the node at the requested path
    #[error("Configuration does not fit {node}")]
    ConfigMismatch {
        /// Kind of node found at the path
        node: &'static str,
    },
}

/// Errors returned by the scheduler
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SchedulerError {
    /// The graph is frozen once the first tick has run
    #[error("Producers cannot be registered after the first tick")]
    Frozen,

    /// Producer table is full
    #[error("Scheduler holds at most {max} producers")]
    CapacityExceeded {
        /// Producer table capacity
        max: usize,
    },

    /// Periods are whole milliseconds, at least one
    #[error("Period must be at least 1 ms")]
    InvalidPeriod,

    /// The producer's graph was rejected
    #[error("Graph rejected: {0}")]
    Graph(GraphError),

    /// A configuration value was rejected
    #[error("Configuration rejected: {0}")]
    Config(ConfigError),
}

impl From<GraphError> for SchedulerError {
    fn from(error: GraphError) -> Self {
        Self::Graph(error)
    }
}

impl From<ConfigError> for SchedulerError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

/// Invalid calibration or transform parameters
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Empty and full reference values coincide
    #[error("Empty and full values must differ")]
    DegenerateRange,

    /// Target range has zero width
    #[error("Target range must have non-zero width")]
    DegenerateTarget,

    /// A parameter is NaN or infinite
    #[error("Parameter {name} is not a finite number")]
    NotFinite {
        /// Parameter name
        name: &'static str,
    },

    /// Moving-average window outside the supported range
    #[error("Window {window} outside 1..={max}")]
    InvalidWindow {
        /// Requested window
        window: usize,
        /// Largest supported window
        max: usize,
    },
}

/// Delivery failure at the telemetry boundary
///
/// Sinks never propagate this; it exists so output implementations can
/// report what happened to whoever is watching their own statistics.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// Transport is not connected
    #[error("Telemetry output unavailable")]
    Unavailable,

    /// Value could not be serialized
    #[error("Value could not be encoded")]
    Encoding,

    /// Transport accepted the message but failed to deliver it
    #[error("Transport error: {reason}")]
    Transport {
        /// Short static description
        reason: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorFault {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Timeout => defmt::write!(fmt, "Timeout"),
            Self::OutOfRange { value } => defmt::write!(fmt, "Reading {} out of range", value),
            Self::NoSignal => defmt::write!(fmt, "No signal"),
            Self::Checksum => defmt::write!(fmt, "Checksum mismatch"),
            Self::Other { reason } => defmt::write!(fmt, "Fault: {}", reason),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for GraphError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::EmptyPath => defmt::write!(fmt, "Empty path"),
            Self::PathTooLong { len, max } => defmt::write!(fmt, "Path {} > {} bytes", len, max),
            Self::DuplicatePath => defmt::write!(fmt, "Duplicate path"),
            Self::TooManyPaths { max } => defmt::write!(fmt, "More than {} paths", max),
            Self::FanoutExceeded { max } => defmt::write!(fmt, "Fan-out > {}", max),
            Self::ChainTooLong { max } => defmt::write!(fmt, "Chain > {} stages", max),
            Self::EmptyChain => defmt::write!(fmt, "Empty chain"),
            Self::SinkHasDownstream => defmt::write!(fmt, "Sink has downstream"),
            Self::TypeMismatch { node, expected, found } => defmt::write!(
                fmt,
                "{} expects {} got {}",
                node,
                expected.name(),
                found.name()
            ),
            Self::InvalidWindow { window, max } => {
                defmt::write!(fmt, "Window {} outside 1..={}", window, max)
            }
            Self::UnknownPath => defmt::write!(fmt, "Unknown path"),
            Self::ConfigMismatch { node } => defmt::write!(fmt, "Config does not fit {}", node),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OutputError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Unavailable => defmt::write!(fmt, "Output unavailable"),
            Self::Encoding => defmt::write!(fmt, "Encoding failed"),
            Self::Transport { reason } => defmt::write!(fmt, "Transport: {}", reason),
        }
    }
}
