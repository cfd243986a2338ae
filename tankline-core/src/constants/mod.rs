//! Constants for Tankline Core
//!
//! Numeric limits and defaults used throughout the engine, grouped by domain:
//! - **Buffers**: capacity limits for the fixed-size graph and scheduler tables
//! - **Time**: sampling intervals and unit conversions
//!
//! Always use these constants instead of magic numbers.

/// Capacity limits for graph nodes, windows and scheduler tables.
pub mod buffers;

/// Time-related constants for sampling intervals.
pub mod time;

pub use buffers::{
    MAX_CHAIN_DEPTH, MAX_FANOUT, MAX_GRAPH_PATHS, MAX_PATH_LEN, MAX_PRODUCERS, MAX_WINDOW,
};

pub use time::{DEFAULT_READ_INTERVAL_MS, MS_PER_SECOND};
