//! Time Constants
//!
//! Sampling intervals and unit conversions.

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Default sensor read interval (ms).
///
/// Ultrasonic tank sensors settle slowly and tank contents slosh; two
/// seconds between reads keeps the moving average window meaningful without
/// flooding the telemetry consumer.
pub const DEFAULT_READ_INTERVAL_MS: u32 = 2000;

/// Default interval for the uptime producer (ms).
pub const DEFAULT_UPTIME_INTERVAL_MS: u32 = 60_000;
