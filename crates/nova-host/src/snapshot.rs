//! Serializable view of a recording session.
//!
//! Snapshots are what the CLI writes to disk after a recording and reads
//! back to regenerate steps, summaries and save payloads.

use std::path::Path;

use nova_protocols::{RecordedEvent, TestStep};
use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::session::SessionState;
use crate::tabs::TimelineTab;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSnapshot {
    /// Page the recording started on.
    pub url: String,
    pub state: SessionState,
    pub active_tab: String,
    /// Timeline tabs, each most recent first.
    pub tabs: Vec<TimelineTab>,
    /// Accepted events in ascending timestamp order.
    pub events: Vec<RecordedEvent>,
    pub steps: Vec<TestStep>,
}

impl RecordingSnapshot {
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), HostError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn active(&self) -> Option<&TimelineTab> {
        self.tabs.iter().find(|tab| tab.id == self.active_tab)
    }
}
