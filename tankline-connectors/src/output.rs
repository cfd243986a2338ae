//! Bridges the core's telemetry boundary to a Signal K connector

use log::{debug, trace};
use tankline_core::{OutputError, TelemetryOutput, Value};

use crate::delta::{Delta, PathValue, Source, Update, DEFAULT_CONTEXT};
use crate::path::validate_path;
use crate::{ConnectionStats, Connector};

/// [`TelemetryOutput`] that publishes each value as a Signal K delta
///
/// The encode buffer is kept between sends, so steady-state publishing
/// does not allocate once the buffer has grown to the largest delta.
#[derive(Debug)]
pub struct SignalKOutput<C: Connector> {
    connector: C,
    source_label: String,
    context: String,
    buffer: Vec<u8>,
}

impl<C: Connector> SignalKOutput<C> {
    /// Publish about `vessels.self`, labelled with `source_label`
    pub fn new(connector: C, source_label: impl Into<String>) -> Self {
        Self {
            connector,
            source_label: source_label.into(),
            context: DEFAULT_CONTEXT.to_string(),
            buffer: Vec::with_capacity(256),
        }
    }

    /// Publish under a different context, e.g. `vessels.urn:mrn:imo:mmsi:230099999`
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Source label attached to every update
    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    /// The transport
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// The transport, mutably
    pub fn connector_mut(&mut self) -> &mut C {
        &mut self.connector
    }

    /// Transport statistics
    pub fn stats(&self) -> &ConnectionStats {
        self.connector.stats()
    }

    /// Encode `value` under `path` into the internal buffer
    fn encode(&mut self, path: &str, value: Value) -> Result<(), crate::ConnectorError> {
        validate_path(path)?;

        let values = [PathValue { path, value }];
        let updates = [Update {
            source: Source { label: &self.source_label },
            timestamp: None,
            values: &values,
        }];
        let delta = Delta { context: &self.context, updates: &updates };

        delta.encode_into(&mut self.buffer)
    }
}

impl<C: Connector> TelemetryOutput for SignalKOutput<C> {
    fn send(&mut self, path: &str, value: Value) -> Result<(), OutputError> {
        if let Err(error) = self.encode(path, value) {
            debug!("Cannot encode {path}: {error}");
            return Err(error.to_output_error());
        }

        match self.connector.send(path, &self.buffer) {
            Ok(()) => {
                trace!("Published {path} = {value}");
                Ok(())
            }
            Err(error) => {
                debug!("Publishing {path} failed: {error}");
                Err(error.to_output_error())
            }
        }
    }
}
