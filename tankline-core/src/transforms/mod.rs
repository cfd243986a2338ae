//! Transform Operators
//!
//! ## Overview
//!
//! A transform consumes one value and emits at most one value. The set is
//! closed and known when the graph is built:
//!
//! | operator          | state            | input    | output   |
//! |-------------------|------------------|----------|----------|
//! | [`Linear`]        | none             | numeric  | float    |
//! | [`MovingAverage`] | last `N` samples | numeric  | float    |
//! | [`Lambda`]        | none             | declared | declared |
//!
//! All three are total over their typed domain, so none of them needs an
//! error path. A producer failure reaches them as an ordinary sentinel value
//! and is processed like any other reading.
//!
//! ## Calibration Example
//!
//! Turning an ultrasonic distance (mm above an empty tank floor) into a
//! smoothed fill percentage:
//!
//! ```rust
//! use tankline_core::{LinearCalibration, MovingAverage};
//!
//! let linear = LinearCalibration::percent(0.0, 1000.0).derive()?;
//! let mut average = MovingAverage::new(10, 1.0)?;
//!
//! let level = average.apply(linear.apply(500.0));
//! assert!((level - 50.0).abs() < 1e-4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod lambda;
mod linear;
mod moving_average;

pub use lambda::Lambda;
pub use linear::Linear;
pub use moving_average::MovingAverage;
