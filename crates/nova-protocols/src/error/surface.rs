//! Browsing surface errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Script execution failed: {0}")]
    ScriptFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Surface disconnected")]
    Disconnected,

    #[error("Surface error: {0}")]
    Other(String),
}
