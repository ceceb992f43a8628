//! Outbound transport backed by an unbounded channel.
//!
//! The bridge sends synchronously; a writer task owns the receiving end and
//! streams each event to the output as a JSON line.

use mapper_core::{Transport, TransportError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// One outbound event as written to the output stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundLine {
    /// Event name.
    pub event: String,
    /// Event payload.
    pub payload: Value,
}

impl OutboundLine {
    /// Build a line from a pre-encoded payload.
    ///
    /// A payload that is not valid JSON is carried as a string.
    #[must_use]
    pub fn new(event: &str, payload: &str) -> Self {
        let payload = serde_json::from_str(payload).unwrap_or_else(|e| {
            tracing::debug!("Payload for {event} is not JSON ({e}), sending as text");
            Value::String(payload.to_string())
        });
        Self {
            event: event.to_string(),
            payload,
        }
    }

    /// Encode as a single line without the trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Sends outbound events into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<OutboundLine>,
}

impl ChannelTransport {
    /// Create a transport and the receiver the writer task drains.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundLine>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Whether the receiving side has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Transport for ChannelTransport {
    fn send(&self, event: &str, payload: &str) -> Result<(), TransportError> {
        self.tx
            .send(OutboundLine::new(event, payload))
            .map_err(|_| TransportError::Closed)
    }
}
