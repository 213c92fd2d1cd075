//! Host errors.

use nova_protocols::{RecordingError, SurfaceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error("Browsing surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Recording file error: {0}")]
    Json(#[from] serde_json::Error),
}
