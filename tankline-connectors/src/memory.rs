//! In-memory connector
//!
//! Keeps every message it is given. Useful for tests and for dry runs that
//! inspect what would have been published.

use crate::{ConnectionStats, Connector, ConnectorError};

/// One message as handed to the connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl SentMessage {
    /// Payload as UTF-8 text; deltas are always valid JSON
    pub fn payload_str(&self) -> &str {
        std::str::from_utf8(&self.payload).unwrap_or_default()
    }
}

/// Connector that records messages instead of sending them
#[derive(Debug, Default)]
pub struct MemoryConnector {
    messages: Vec<SentMessage>,
    capacity: Option<usize>,
    disconnected: bool,
    stats: ConnectionStats,
}

impl MemoryConnector {
    /// Unbounded, connected
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse messages with `BufferFull` once `capacity` are stored
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Simulate losing or regaining the link
    pub fn set_connected(&mut self, connected: bool) {
        if connected && self.disconnected {
            self.stats.reconnections += 1;
        }
        self.disconnected = !connected;
    }

    /// Messages stored so far, oldest first
    pub fn messages(&self) -> &[SentMessage] {
        &self.messages
    }

    /// Remove and return stored messages
    pub fn drain(&mut self) -> Vec<SentMessage> {
        std::mem::take(&mut self.messages)
    }
}

impl Connector for MemoryConnector {
    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), ConnectorError> {
        let result = if self.disconnected {
            Err(ConnectorError::NotConnected)
        } else if self.capacity.map_or(false, |cap| self.messages.len() >= cap) {
            Err(ConnectorError::BufferFull)
        } else {
            self.messages.push(SentMessage {
                topic: topic.to_string(),
                payload: data.to_vec(),
            });
            Ok(())
        };

        match &result {
            Ok(()) => self.stats.record_sent(data.len()),
            Err(error) => self.stats.record_failure(error),
        }
        result
    }

    fn is_connected(&self) -> bool {
        !self.disconnected
    }

    fn stats(&self) -> &ConnectionStats {
        &self.stats
    }
}
