//! Dataflow Graph
//!
//! ## Overview
//!
//! A graph is an ownership tree. Each producer owns its directly connected
//! nodes, each transform owns its own downstream list, and sinks own
//! nothing. There are no back pointers and no shared nodes, so the tree is
//! acyclic by construction.
//!
//! ```text
//! Producer ──► Linear ──► MovingAverage ──► Sink  (tanks.fuel.currentLevel)
//!
//! Producer ──► Lambda(int → bool) ──► Sink         (status flag)
//! ```
//!
//! ## Module Organization
//!
//! - Node and operator types (this file)
//! - `builder` - [`Chain`], for readable linear wiring
//! - `sink` - [`Sink`], the terminal node
//!
//! ## Lifecycle
//!
//! 1. Nodes are built and connected by value (`connect` consumes `self`).
//! 2. The finished tree is handed to a [`Producer`], which is registered
//!    with the [`Scheduler`]. Registration type-checks the tree and checks
//!    that every path is unique.
//! 3. After the first tick the scheduler refuses new producers. Nodes can
//!    still be reconfigured by path, but never rewired: nothing hands out
//!    mutable access to a downstream list.
//!
//! [`Producer`]: crate::producer::Producer
//! [`Scheduler`]: crate::scheduler::Scheduler

use alloc::boxed::Box;

use heapless::Vec;

use crate::config::TransformConfig;
use crate::constants::buffers::{MAX_FANOUT, MAX_GRAPH_PATHS};
use crate::errors::{GraphError, GraphResult};
use crate::output::TelemetryOutput;
use crate::transforms::{Lambda, Linear, MovingAverage};
use crate::value::{Path, Value, ValueKind};

pub mod builder;
pub mod sink;

pub use builder::Chain;
pub use sink::{Sink, SinkStats};

/// Downstream connections owned by a producer or transform, in connection order
pub type Downstream = Vec<Box<Node>, MAX_FANOUT>;

/// Paths claimed so far while validating graphs
pub(crate) type PathSet = Vec<Path, MAX_GRAPH_PATHS>;

/// Record `path` as taken
pub(crate) fn claim_path(seen: &mut PathSet, path: &Path) -> GraphResult<()> {
    if seen.contains(path) {
        log_warn!("Path {} claimed twice", path.as_str());
        return Err(GraphError::DuplicatePath);
    }

    seen.push(path.clone())
        .map_err(|_| GraphError::TooManyPaths { max: MAX_GRAPH_PATHS })
}

/// Hand `value` to every node in `downstream`, in order
pub(crate) fn forward(downstream: &mut Downstream, value: Value, out: &mut dyn TelemetryOutput) {
    for node in downstream.iter_mut() {
        node.propagate(value, out);
    }
}

/// The closed set of node operators
#[derive(Debug)]
pub enum Operator {
    /// Affine scaling
    Linear(Linear),
    /// Windowed mean
    MovingAverage(MovingAverage),
    /// Typed mapping function
    Lambda(Lambda),
    /// Terminal output
    Sink(Sink),
}

impl Operator {
    /// Short name for logs and errors
    pub const fn name(&self) -> &'static str {
        match self {
            Operator::Linear(_) => "linear",
            Operator::MovingAverage(_) => "moving average",
            Operator::Lambda(_) => "lambda",
            Operator::Sink(_) => "sink",
        }
    }

    /// Kind this operator consumes
    pub fn input_kind(&self) -> ValueKind {
        match self {
            Operator::Linear(_) | Operator::MovingAverage(_) => ValueKind::Float,
            Operator::Lambda(op) => op.input_kind(),
            Operator::Sink(sink) => sink.kind(),
        }
    }

    /// Kind this operator emits; `None` for sinks
    pub fn output_kind(&self) -> Option<ValueKind> {
        match self {
            Operator::Linear(_) | Operator::MovingAverage(_) => Some(ValueKind::Float),
            Operator::Lambda(op) => Some(op.output_kind()),
            Operator::Sink(_) => None,
        }
    }
}

/// One node of the graph: an operator plus the nodes it feeds
#[derive(Debug)]
pub struct Node {
    /// Configuration path; sinks use their publish path instead
    path: Option<Path>,
    op: Operator,
    downstream: Downstream,
}

impl Node {
    fn with_operator(op: Operator) -> Self {
        Self { path: None, op, downstream: Vec::new() }
    }

    /// Affine transform node
    pub fn linear(op: Linear) -> Self {
        Self::with_operator(Operator::Linear(op))
    }

    /// Moving average node
    pub fn moving_average(op: MovingAverage) -> Self {
        Self::with_operator(Operator::MovingAverage(op))
    }

    /// Mapping node
    pub fn lambda(op: Lambda) -> Self {
        Self::with_operator(Operator::Lambda(op))
    }

    /// Terminal node
    pub fn sink(sink: Sink) -> Self {
        Self::with_operator(Operator::Sink(sink))
    }

    /// Make this node addressable under `path`
    ///
    /// For sinks this replaces the publish path.
    pub fn with_path(mut self, path: &str) -> GraphResult<Self> {
        let path = Path::new(path)?;
        match &mut self.op {
            Operator::Sink(sink) => sink.set_path(path),
            _ => self.path = Some(path),
        }
        Ok(self)
    }

    /// Append `child` to this node's downstream list
    pub fn connect(mut self, child: Node) -> GraphResult<Self> {
        if matches!(self.op, Operator::Sink(_)) {
            return Err(GraphError::SinkHasDownstream);
        }

        self.downstream
            .push(Box::new(child))
            .map_err(|_| GraphError::FanoutExceeded { max: MAX_FANOUT })?;

        Ok(self)
    }

    /// Addressable path, if any
    pub fn path(&self) -> Option<&Path> {
        match &self.op {
            Operator::Sink(sink) => Some(sink.path()),
            _ => self.path.as_ref(),
        }
    }

    /// The operator this node runs
    pub fn operator(&self) -> &Operator {
        &self.op
    }

    /// Directly connected nodes, in connection order
    pub fn downstream(&self) -> impl Iterator<Item = &Node> {
        self.downstream.iter().map(|node| &**node)
    }

    /// Run one value through this node and everything below it
    ///
    /// Linear and moving-average nodes skip non-numeric input, lambdas skip
    /// per their own rules. Validation at registration makes both
    /// impossible in a registered graph.
    pub fn propagate(&mut self, value: Value, out: &mut dyn TelemetryOutput) {
        let emitted = match &mut self.op {
            Operator::Linear(op) => value.as_f32().map(|x| Value::Float(op.apply(x))),
            Operator::MovingAverage(op) => value.as_f32().map(|x| Value::Float(op.apply(x))),
            Operator::Lambda(op) => op.apply(value),
            Operator::Sink(sink) => {
                sink.emit(value, out);
                None
            }
        };

        if let Some(value) = emitted {
            forward(&mut self.downstream, value, out);
        }
    }

    /// Check that this subtree accepts `input` and claim its paths
    pub(crate) fn validate(&self, input: ValueKind, seen: &mut PathSet) -> GraphResult<()> {
        let expected = self.op.input_kind();
        if !expected.accepts(input) {
            return Err(GraphError::TypeMismatch {
                node: self.op.name(),
                expected,
                found: input,
            });
        }

        if let Some(path) = self.path() {
            claim_path(seen, path)?;
        }

        if let Some(output) = self.op.output_kind() {
            for child in self.downstream() {
                child.validate(output, seen)?;
            }
        }

        Ok(())
    }

    /// Find the node addressable under `path` in this subtree
    pub fn find_mut(&mut self, path: &str) -> Option<&mut Node> {
        if self.path().map_or(false, |own| own == path) {
            return Some(self);
        }

        self.downstream
            .iter_mut()
            .find_map(|child| child.find_mut(path))
    }

    /// Swap transform parameters
    ///
    /// Intended for use between ticks. Changing a moving-average window
    /// discards its history; changing only the scale keeps it.
    pub fn configure(&mut self, config: TransformConfig) -> GraphResult<()> {
        match (&mut self.op, config) {
            (Operator::Linear(op), TransformConfig::Linear { multiplier, offset }) => {
                op.set_params(multiplier, offset);
            }
            (Operator::MovingAverage(op), TransformConfig::MovingAverage { window, scale }) => {
                if window != op.window() {
                    op.set_window(window)?;
                }
                op.set_scale(scale);
            }
            (op, _) => return Err(GraphError::ConfigMismatch { node: op.name() }),
        }

        log_debug!("Reconfigured {}", self.path().map_or("?", |p| p.as_str()));
        Ok(())
    }

    /// Visit every addressable path in this subtree, depth first
    pub fn for_each_path<F: FnMut(&Path, &Operator)>(&self, f: &mut F) {
        if let Some(path) = self.path() {
            f(path, &self.op);
        }

        for child in self.downstream() {
            child.for_each_path(f);
        }
    }
}
