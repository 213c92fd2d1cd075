//! Host-side timeline entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::RecordedEvent;

/// What a timeline entry wraps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TimelineEntry {
    /// An event accepted from the recorder channel.
    Recorded { event: RecordedEvent },
    /// A page load observed by the host itself.
    Navigation { url: String },
}

/// A display/derivation wrapper around a recorded or synthesized event.
///
/// Never mutated after creation; only removed from its collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub title: String,
    pub timestamp: u64,
    #[serde(flatten)]
    pub entry: TimelineEntry,
}

impl TimelineEvent {
    /// Wrap an accepted recorder event.
    pub fn recorded(event: RecordedEvent) -> Self {
        let title = event.summary();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            timestamp: event.timestamp,
            entry: TimelineEntry::Recorded { event },
        }
    }

    /// Synthesize a navigation entry.
    pub fn navigation(url: impl Into<String>, timestamp: u64) -> Self {
        let url = url.into();
        Self {
            id: Uuid::new_v4().to_string(),
            title: format!("Navigate to {}", url),
            timestamp,
            entry: TimelineEntry::Navigation { url },
        }
    }

    /// Action label: the event type, or `navigation`.
    pub fn action(&self) -> &'static str {
        match &self.entry {
            TimelineEntry::Recorded { event } => event.event_type.as_str(),
            TimelineEntry::Navigation { .. } => "navigation",
        }
    }

    pub fn recorded_event(&self) -> Option<&RecordedEvent> {
        match &self.entry {
            TimelineEntry::Recorded { event } => Some(event),
            TimelineEntry::Navigation { .. } => None,
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self.entry, TimelineEntry::Navigation { .. })
    }
}
