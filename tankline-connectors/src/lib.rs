//! Signal K Telemetry Output
//!
//! ## Overview
//!
//! The core engine hands every sink emission to a
//! [`TelemetryOutput`](tankline_core::TelemetryOutput) as a `(path, value)`
//! pair. This crate turns those pairs into Signal K delta messages and
//! passes the encoded bytes to a [`Connector`], which owns the transport.
//!
//! ```text
//! Sink ──(path, value)──► SignalKOutput ──delta JSON──► Connector ──► server
//! ```
//!
//! ## Delta Format
//!
//! One delta per emission, so a slow or failing transport never holds back
//! values from other sinks:
//!
//! ```json
//! {"context":"vessels.self",
//!  "updates":[{"source":{"label":"tank-sensor"},
//!              "values":[{"path":"tanks.fuel.currentLevel","value":50.0}]}]}
//! ```
//!
//! Non-finite floats (the default float sentinel is NaN) are sent as `null`,
//! which Signal K consumers read as "no value".
//!
//! ## Connectors
//!
//! | Connector | Use |
//! |-----------|-----|
//! | [`WriterConnector`] | newline-delimited deltas to any `io::Write` (stdout, a TCP stream, a file) |
//! | [`MemoryConnector`] | keeps every message; tests and dry runs |
//!
//! Session management, discovery and authentication against a Signal K
//! server stay outside this crate; a connector only has to move bytes.
//!
//! ## Example Usage
//!
//! ```rust
//! use tankline_connectors::{MemoryConnector, SignalKOutput};
//! use tankline_core::{TelemetryOutput, Value};
//!
//! let mut output = SignalKOutput::new(MemoryConnector::new(), "tank-sensor");
//! output.send("tanks.fuel.currentLevel", Value::Float(50.0))?;
//!
//! let sent = &output.connector().messages()[0];
//! assert!(sent.payload_str().contains("\"value\":50.0"));
//! # Ok::<(), tankline_core::OutputError>(())
//! ```

pub mod delta;
pub mod memory;
pub mod output;
pub mod path;
pub mod writer;

// Re-export common types
pub use delta::{Delta, PathValue, Source, Update, DEFAULT_CONTEXT};
pub use memory::{MemoryConnector, SentMessage};
pub use output::SignalKOutput;
pub use path::{config_path, validate_path, PathError};
pub use writer::WriterConnector;

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The link is down; nothing was sent
    #[error("Not connected")]
    NotConnected,

    /// The connector cannot hold another message
    #[error("Buffer full")]
    BufferFull,

    /// Writing to the underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The delta could not be serialized
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The value was addressed to a malformed Signal K path
    #[error("Invalid Signal K path: {0}")]
    InvalidPath(#[from] PathError),
}

impl ConnectorError {
    /// Collapse into the core's copyable output error
    pub fn to_output_error(&self) -> tankline_core::OutputError {
        use tankline_core::OutputError;

        match self {
            ConnectorError::NotConnected => OutputError::Unavailable,
            ConnectorError::BufferFull => OutputError::Transport { reason: "buffer full" },
            ConnectorError::Io(_) => OutputError::Transport { reason: "i/o error" },
            ConnectorError::Encoding(_) | ConnectorError::InvalidPath(_) => OutputError::Encoding,
        }
    }
}

/// Trait for all transports that carry encoded deltas
pub trait Connector {
    /// Send one encoded message; `topic` is the Signal K path it carries
    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), ConnectorError>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Get connection statistics
    fn stats(&self) -> &ConnectionStats;
}

impl<C: Connector + ?Sized> Connector for Box<C> {
    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), ConnectorError> {
        (**self).send(topic, data)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn stats(&self) -> &ConnectionStats {
        (**self).stats()
    }
}

/// Connection statistics common to all connectors
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages failed to send
    pub messages_failed: u64,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Number of reconnections
    pub reconnections: u32,
    /// Last error message
    pub last_error: Option<String>,
}

impl ConnectionStats {
    /// Count a delivered message of `bytes` bytes
    pub fn record_sent(&mut self, bytes: usize) {
        self.messages_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    /// Count a failed message
    pub fn record_failure(&mut self, error: &ConnectorError) {
        self.messages_failed += 1;
        self.last_error = Some(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tankline_core::OutputError;

    #[test]
    fn errors_map_onto_output_errors() {
        assert_eq!(ConnectorError::NotConnected.to_output_error(), OutputError::Unavailable);
        assert_eq!(
            ConnectorError::BufferFull.to_output_error(),
            OutputError::Transport { reason: "buffer full" }
        );
        assert_eq!(
            ConnectorError::from(PathError::Empty).to_output_error(),
            OutputError::Encoding
        );

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        assert!(matches!(
            ConnectorError::from(io).to_output_error(),
            OutputError::Transport { .. }
        ));
    }

    #[test]
    fn stats_keep_last_error() {
        let mut stats = ConnectionStats::default();
        stats.record_sent(40);
        stats.record_failure(&ConnectorError::BufferFull);

        assert_eq!(stats.messages_sent, 1);
        assert_eq!(stats.bytes_sent, 40);
        assert_eq!(stats.messages_failed, 1);
        assert_eq!(stats.last_error.as_deref(), Some("Buffer full"));
    }
}
