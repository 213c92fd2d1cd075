//! Channel protocol errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Not a channel message")]
    NotAChannelMessage,

    #[error("Malformed channel message: {0}")]
    Malformed(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(e: serde_json::Error) -> Self {
        ProtocolError::Malformed(e.to_string())
    }
}
