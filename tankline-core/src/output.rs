//! Telemetry output boundary
//!
//! Sinks hand `(path, value)` pairs to a [`TelemetryOutput`]. Serialization,
//! transport, retries and buffering all live behind this trait; the engine
//! never looks at what happens to a value after `send` returns.

use crate::errors::OutputError;
use crate::value::Value;

/// Destination for sink emissions
///
/// Implementations should return quickly: `send` runs inside the scheduler
/// tick, and a slow call stalls every producer behind it.
pub trait TelemetryOutput {
    /// Deliver one value published under `path`
    fn send(&mut self, path: &str, value: Value) -> Result<(), OutputError>;
}

impl<T: TelemetryOutput + ?Sized> TelemetryOutput for &mut T {
    fn send(&mut self, path: &str, value: Value) -> Result<(), OutputError> {
        (**self).send(path, value)
    }
}

/// Output that accepts and discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutput;

impl TelemetryOutput for NullOutput {
    fn send(&mut self, _path: &str, _value: Value) -> Result<(), OutputError> {
        Ok(())
    }
}
