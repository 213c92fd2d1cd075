//! Timestamp-based duplicate suppression.
//!
//! Two rules, both measured against the single most recently accepted event
//! whatever its type:
//!
//! - an `input` arriving within the input window is dropped;
//! - any other event is dropped when it repeats the previous event's
//!   selector, path, id, name, type and value within the cascade window.
//!
//! For the cascade rule a `change` directly after a `click` counts as the
//! same type: a single click on a checkbox, radio or option fires both.

use std::time::Duration;

use nova_config::RecorderConfig;
use nova_protocols::{EventType, RecordedEvent};

#[derive(Debug, Clone)]
pub struct DedupFilter {
    input_window_ms: u64,
    cascade_window_ms: u64,
    last: Option<RecordedEvent>,
}

impl DedupFilter {
    pub fn new(input_window: Duration, cascade_window: Duration) -> Self {
        Self {
            input_window_ms: input_window.as_millis() as u64,
            cascade_window_ms: cascade_window.as_millis() as u64,
            last: None,
        }
    }

    pub fn from_config(config: &RecorderConfig) -> Self {
        Self::new(config.input_dedup_window(), config.cascade_dedup_window())
    }

    /// Whether `event` would be suppressed, without updating the fingerprint.
    pub fn is_duplicate(&self, event: &RecordedEvent) -> bool {
        let Some(last) = &self.last else {
            return false;
        };
        let elapsed = event.timestamp.saturating_sub(last.timestamp);

        if event.event_type == EventType::Input {
            return elapsed < self.input_window_ms;
        }

        elapsed < self.cascade_window_ms && same_target(last, event) && cascade_types(last, event)
    }

    /// Check `event` and, if it passes, make it the new fingerprint.
    pub fn accept(&mut self, event: &RecordedEvent) -> bool {
        if self.is_duplicate(event) {
            return false;
        }
        self.last = Some(event.clone());
        true
    }

    /// The most recently accepted event.
    pub fn last(&self) -> Option<&RecordedEvent> {
        self.last.as_ref()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

fn same_target(a: &RecordedEvent, b: &RecordedEvent) -> bool {
    a.selector == b.selector
        && a.xpath == b.xpath
        && a.id == b.id
        && a.name == b.name
        && a.value == b.value
}

fn cascade_types(previous: &RecordedEvent, next: &RecordedEvent) -> bool {
    previous.event_type == next.event_type
        || (previous.event_type == EventType::Click && next.event_type == EventType::Change)
}
