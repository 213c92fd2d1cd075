//! User-facing recording errors.
//!
//! These are the only failures surfaced to the user; they are raised
//! synchronously at the point of the action and nothing is partially applied.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordingError {
    #[error("No recorded events to save")]
    NoEvents,

    #[error("Please select a project first")]
    NoProjectSelected,

    #[error("Test name must not be empty")]
    EmptyTestName,

    #[error("Please navigate to a website first")]
    NoPageLoaded,

    #[error("Timeline name must not be empty")]
    EmptyTabName,

    #[error("Cannot delete the last timeline tab")]
    LastTab,

    #[error("Timeline tab not found: {0}")]
    TabNotFound(String),

    #[error("Timeline event not found: {0}")]
    EventNotFound(String),

    #[error("Recorder host is not running")]
    HostStopped,
}
