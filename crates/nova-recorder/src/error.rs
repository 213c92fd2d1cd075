//! Recorder errors.
//!
//! None of these cross the channel: the recorder logs them where they occur
//! and carries on with the remaining frames.

use nova_dom::DocumentId;
use nova_protocols::ProtocolError;
use thiserror::Error;

use crate::context::WindowId;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Blocked a frame from accessing a cross-origin frame: {src}")]
    CrossOrigin { src: String },

    #[error("Unknown document: {0:?}")]
    UnknownDocument(DocumentId),

    #[error("Node is not an iframe element")]
    NotAFrame,

    #[error("Window {0:?} closed before it could be instrumented")]
    WindowClosed(WindowId),

    #[error("Window {window:?} not ready after {attempts} attempts")]
    WindowNotReady { window: WindowId, attempts: usize },

    #[error("Failed to encode event: {0}")]
    Encode(#[from] ProtocolError),
}
