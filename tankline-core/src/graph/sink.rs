//! Terminal graph nodes

use crate::errors::GraphResult;
use crate::output::TelemetryOutput;
use crate::value::{Path, Value, ValueKind};

/// Delivery counters for one sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Values accepted by the output
    pub delivered: u32,
    /// Values the output rejected
    pub failed: u32,
    /// Values that could not be converted to the sink's kind
    pub skipped: u32,
}

/// Forwards values to the telemetry boundary under a fixed path
///
/// No retry and no buffering: if the output rejects a value the sink counts
/// it and moves on. Nothing is reported upstream.
#[derive(Debug, Clone)]
pub struct Sink {
    path: Path,
    kind: ValueKind,
    stats: SinkStats,
}

impl Sink {
    /// Sink publishing values of `kind` under `path`
    pub fn new(path: &str, kind: ValueKind) -> GraphResult<Self> {
        Ok(Self {
            path: Path::new(path)?,
            kind,
            stats: SinkStats::default(),
        })
    }

    /// Float output, the common case for calibrated measurements
    pub fn float(path: &str) -> GraphResult<Self> {
        Self::new(path, ValueKind::Float)
    }

    /// Integer output, for counters
    pub fn int(path: &str) -> GraphResult<Self> {
        Self::new(path, ValueKind::Int)
    }

    /// Boolean output, for health and status flags
    pub fn bool(path: &str) -> GraphResult<Self> {
        Self::new(path, ValueKind::Bool)
    }

    /// Publish `value` through `out`
    pub fn emit(&mut self, value: Value, out: &mut dyn TelemetryOutput) {
        let Some(value) = value.coerce(self.kind) else {
            self.stats.skipped = self.stats.skipped.wrapping_add(1);
            return;
        };

        match out.send(self.path.as_str(), value) {
            Ok(()) => {
                self.stats.delivered = self.stats.delivered.wrapping_add(1);
                log_trace!("{} <- {}", self.path.as_str(), value);
            }
            Err(_error) => {
                self.stats.failed = self.stats.failed.wrapping_add(1);
                log_debug!("Delivery to {} failed: {}", self.path.as_str(), _error);
            }
        }
    }

    /// Publish path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Kind published
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Delivery counters
    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    pub(crate) fn set_path(&mut self, path: Path) {
        self.path = path;
    }
}
