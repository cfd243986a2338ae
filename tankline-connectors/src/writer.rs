//! Newline-delimited deltas over any `io::Write`
//!
//! One compact JSON delta per line, flushed after every message. Pointed at
//! stdout this is a readable log of what the device publishes; pointed at a
//! `TcpStream` it speaks the plain TCP stream form a Signal K server accepts.

use std::io::Write;

use crate::{ConnectionStats, Connector, ConnectorError};

/// Writes each message followed by `\n`
#[derive(Debug)]
pub struct WriterConnector<W: Write> {
    writer: W,
    broken: bool,
    stats: ConnectionStats,
}

impl<W: Write> WriterConnector<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            broken: false,
            stats: ConnectionStats::default(),
        }
    }

    /// The wrapped writer
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Unwrap, returning the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(data)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write> Connector for WriterConnector<W> {
    fn send(&mut self, _topic: &str, data: &[u8]) -> Result<(), ConnectorError> {
        match self.write_line(data) {
            Ok(()) => {
                if self.broken {
                    self.broken = false;
                    self.stats.reconnections += 1;
                }
                self.stats.record_sent(data.len() + 1);
                Ok(())
            }
            Err(io) => {
                self.broken = true;
                let error = ConnectorError::Io(io);
                self.stats.record_failure(&error);
                Err(error)
            }
        }
    }

    fn is_connected(&self) -> bool {
        !self.broken
    }

    fn stats(&self) -> &ConnectionStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Write for Failing {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn one_message_per_line() {
        let mut connector = WriterConnector::new(Vec::new());
        connector.send("a", b"{\"x\":1}").unwrap();
        connector.send("b", b"{\"x\":2}").unwrap();

        assert_eq!(connector.get_ref().as_slice(), b"{\"x\":1}\n{\"x\":2}\n");
        assert_eq!(connector.stats().bytes_sent, 16);
    }

    #[test]
    fn write_errors_are_reported() {
        let mut connector = WriterConnector::new(Failing);

        assert!(matches!(connector.send("a", b"{}"), Err(ConnectorError::Io(_))));
        assert!(!connector.is_connected());
        assert_eq!(connector.stats().messages_failed, 1);
    }
}
