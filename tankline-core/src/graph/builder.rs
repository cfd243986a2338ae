//! Chain builder
//!
//! Most graphs are straight lines. [`Chain`] lets them be written in data
//! flow order instead of nesting `connect` calls inside out.

use heapless::Vec;

use crate::constants::buffers::MAX_CHAIN_DEPTH;
use crate::errors::{GraphError, GraphResult};

use super::Node;

/// Builds `a → b → c` from stages given in flow order
///
/// ```rust
/// use tankline_core::{Chain, Lambda, Node, Sink};
///
/// let status = Chain::new()
///     .then(Node::lambda(Lambda::new(|code: i32| code == 1)))
///     .then(Node::sink(Sink::bool("tanks.fuel.sensorStatus")?))
///     .build()?;
///
/// assert_eq!(status.downstream().count(), 1);
/// # Ok::<(), tankline_core::GraphError>(())
/// ```
pub struct Chain {
    stages: Vec<Node, MAX_CHAIN_DEPTH>,
    overflowed: bool,
}

impl Chain {
    /// Empty chain
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            overflowed: false,
        }
    }

    /// Append a stage after the current last one
    pub fn then(mut self, node: Node) -> Self {
        if self.stages.push(node).is_err() {
            self.overflowed = true;
        }
        self
    }

    /// Number of stages so far
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True if no stage was added
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Wire the stages together and return the head node
    pub fn build(self) -> GraphResult<Node> {
        if self.overflowed {
            return Err(GraphError::ChainTooLong { max: MAX_CHAIN_DEPTH });
        }

        let mut stages = self.stages;
        let mut tail = stages.pop().ok_or(GraphError::EmptyChain)?;

        while let Some(parent) = stages.pop() {
            tail = parent.connect(tail)?;
        }

        Ok(tail)
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Operator, Sink};
    use crate::transforms::{Linear, MovingAverage};

    #[test]
    fn empty_chain_is_an_error() {
        assert_eq!(Chain::new().build().err(), Some(GraphError::EmptyChain));
    }

    #[test]
    fn builds_in_flow_order() {
        let head = Chain::new()
            .then(Node::linear(Linear::new(0.1, 0.0)))
            .then(Node::moving_average(MovingAverage::new(10, 1.0).unwrap()))
            .then(Node::sink(Sink::float("tanks.fuel.currentLevel").unwrap()))
            .build()
            .unwrap();

        assert!(matches!(head.operator(), Operator::Linear(_)));

        let second = head.downstream().next().unwrap();
        assert!(matches!(second.operator(), Operator::MovingAverage(_)));

        let third = second.downstream().next().unwrap();
        assert!(matches!(third.operator(), Operator::Sink(_)));
        assert_eq!(third.downstream().count(), 0);
    }

    #[test]
    fn too_many_stages() {
        let mut chain = Chain::new();
        for _ in 0..=MAX_CHAIN_DEPTH {
            chain = chain.then(Node::linear(Linear::identity()));
        }

        assert_eq!(chain.build().err(), Some(GraphError::ChainTooLong { max: MAX_CHAIN_DEPTH }));
    }
}
