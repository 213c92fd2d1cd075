//! # Nova Config
//!
//! Configuration management for the nova recorder: timing windows for the
//! host pipeline, browsing surface settings, load retry policy and logging.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
