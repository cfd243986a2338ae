//! Buffer and Table Capacities
//!
//! Every collection in the tick path has a capacity fixed at compile time.
//! Graphs that exceed these limits are rejected while they are being built,
//! never while they run.
//!
//! ```text
//! Node (moving average)      ~ 4 * MAX_WINDOW + MAX_PATH_LEN + 8 * MAX_FANOUT bytes
//! Scheduler                  ~ MAX_PRODUCERS * size_of::<Producer>() bytes
//! ```

/// Longest path/identifier, in bytes.
///
/// Signal K paths such as `tanks.fuel.currentLevel` or configuration paths
/// such as `/tanks_fuel_currentLevel/samples` fit comfortably.
pub const MAX_PATH_LEN: usize = 64;

/// Maximum downstream connections owned by a single producer or transform.
pub const MAX_FANOUT: usize = 4;

/// Maximum number of stages accepted by [`Chain`](crate::graph::Chain).
pub const MAX_CHAIN_DEPTH: usize = 8;

/// Largest moving-average window.
///
/// The window storage is inline, so each moving average costs
/// `4 * MAX_WINDOW` bytes regardless of the configured window.
pub const MAX_WINDOW: usize = 64;

/// Maximum number of producers a scheduler can hold.
pub const MAX_PRODUCERS: usize = 8;

/// Maximum number of addressable paths across all registered graphs.
pub const MAX_GRAPH_PATHS: usize = 32;
