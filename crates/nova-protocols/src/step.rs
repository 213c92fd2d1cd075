//! Derived test steps.

use serde::{Deserialize, Serialize};

/// A human/machine-readable instruction derived from recorded events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    pub id: String,
    pub description: String,
    pub code: String,
}

impl TestStep {
    pub fn new(id: impl Into<String>, description: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            code: code.into(),
        }
    }
}
