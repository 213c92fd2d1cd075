//! Wire codec for the recorder -> host channel.
//!
//! The channel carries exactly one message shape:
//!
//! ```json
//! {"type": "RECORDED_EVENT", "event": { ...RecordedEvent... }}
//! ```
//!
//! Anything else is not ours and is rejected with a [`ProtocolError`] that the
//! host drops silently.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::event::RecordedEvent;

/// Message type tag for recorded events.
pub const RECORDED_EVENT: &str = "RECORDED_EVENT";

/// A message carried on the recorder channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChannelMessage {
    #[serde(rename = "RECORDED_EVENT")]
    RecordedEvent { event: RecordedEvent },
}

impl ChannelMessage {
    pub fn recorded(event: RecordedEvent) -> Self {
        ChannelMessage::RecordedEvent { event }
    }

    /// Serialize to the string form posted on the channel.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a raw channel string.
    ///
    /// Cheap prefix checks run first so unrelated console noise never reaches
    /// the JSON parser. The embedded event is validated before returning.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        let trimmed = raw.trim();
        if !trimmed.starts_with('{') || !trimmed.contains(RECORDED_EVENT) {
            return Err(ProtocolError::NotAChannelMessage);
        }
        let message: ChannelMessage = serde_json::from_str(trimmed)?;
        match &message {
            ChannelMessage::RecordedEvent { event } => event.validate()?,
        }
        Ok(message)
    }

    /// Unwrap the carried event.
    pub fn into_event(self) -> RecordedEvent {
        match self {
            ChannelMessage::RecordedEvent { event } => event,
        }
    }
}
