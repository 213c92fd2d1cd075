//! The recording state machine.
//!
//! `Idle -> start -> Recording -> stop -> Idle`. Only a recording session
//! accepts channel messages; everything else is discarded at ingestion.
//! All methods run to completion, the caller owns the timer that drives
//! [`RecordingSession::flush_due`].

use chrono::{DateTime, Local};
use nova_config::RecorderConfig;
use nova_protocols::{
    ChannelMessage, EventType, RecordedEvent, RecordingError, SavedTestPayload, TestStep,
    TimelineEvent,
};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::debounce::InputDebouncer;
use crate::dedup::DedupFilter;
use crate::save::{build_saved_test, SaveOptions};
use crate::snapshot::RecordingSnapshot;
use crate::steps::generate_steps;
use crate::tabs::TimelineTabs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
}

/// What happened to one raw channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Not a recorder message, or malformed.
    Ignored,
    /// Well-formed but the session is idle.
    Discarded,
    Processed {
        /// Events that reached the timeline.
        accepted: usize,
        /// Events dropped by dedup.
        suppressed: usize,
        /// The message was held by the input debouncer.
        buffered: bool,
    },
}

#[derive(Debug)]
pub struct RecordingSession {
    state: SessionState,
    url: String,
    blank_url: String,
    tabs: TimelineTabs,
    events: Vec<RecordedEvent>,
    steps: Vec<TestStep>,
    dedup: DedupFilter,
    debouncer: InputDebouncer,
    regenerations: u64,
}

#[derive(Debug, Default)]
struct Tally {
    accepted: usize,
    suppressed: usize,
}

impl RecordingSession {
    pub fn new(config: &RecorderConfig, blank_url: impl Into<String>) -> Self {
        Self {
            state: SessionState::Idle,
            url: String::new(),
            blank_url: blank_url.into(),
            tabs: TimelineTabs::new(),
            events: Vec::new(),
            steps: Vec::new(),
            dedup: DedupFilter::from_config(config),
            debouncer: InputDebouncer::new(config.input_debounce()),
            regenerations: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// Page the current recording started on.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Begin recording on `url`, discarding the previous recording.
    pub fn start(&mut self, url: &str) -> Result<(), RecordingError> {
        if url.is_empty() || url == self.blank_url {
            return Err(RecordingError::NoPageLoaded);
        }
        self.reset();
        self.url = url.to_string();
        self.state = SessionState::Recording;
        info!(url = %url, "Recording started");
        Ok(())
    }

    /// Stop recording. A buffered keystroke is dropped, not flushed.
    pub fn stop(&mut self) {
        self.debouncer.cancel();
        if self.state == SessionState::Recording {
            info!(events = self.events.len(), "Recording stopped");
        }
        self.state = SessionState::Idle;
    }

    /// Empty the active tab and the accumulator without changing state.
    pub fn clear(&mut self) {
        self.reset();
        debug!("Recording cleared");
    }

    fn reset(&mut self) {
        self.debouncer.cancel();
        self.dedup.reset();
        self.tabs.active_mut().clear();
        self.events.clear();
        self.regenerate();
    }

    /// Feed one raw channel string through the pipeline.
    pub fn ingest(&mut self, raw: &str, now: Instant) -> IngestOutcome {
        let event = match ChannelMessage::decode(raw) {
            Ok(message) => message.into_event(),
            Err(e) => {
                debug!(error = %e, "Ignoring channel message");
                return IngestOutcome::Ignored;
            }
        };

        if !self.is_recording() {
            debug!(event_type = %event.event_type.as_str(), "Discarding event while idle");
            return IngestOutcome::Discarded;
        }

        let mut tally = Tally::default();
        let buffered = event.event_type == EventType::Input;
        if buffered {
            if let Some(previous) = self.debouncer.push(event, now) {
                self.process(previous, &mut tally);
            }
        } else {
            if let Some(pending) = self.debouncer.flush() {
                self.process(pending, &mut tally);
            }
            self.process(event, &mut tally);
        }

        IngestOutcome::Processed {
            accepted: tally.accepted,
            suppressed: tally.suppressed,
            buffered,
        }
    }

    /// Release a buffered keystroke whose pause has elapsed.
    ///
    /// Returns whether an event reached the timeline.
    pub fn flush_due(&mut self, now: Instant) -> bool {
        if !self.is_recording() {
            self.debouncer.cancel();
            return false;
        }
        let Some(event) = self.debouncer.take_due(now) else {
            return false;
        };
        let mut tally = Tally::default();
        self.process(event, &mut tally);
        tally.accepted > 0
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    fn process(&mut self, event: RecordedEvent, tally: &mut Tally) {
        if !self.dedup.accept(&event) {
            debug!(
                event_type = %event.event_type.as_str(),
                selector = %event.selector,
                "Suppressed duplicate event"
            );
            tally.suppressed += 1;
            return;
        }

        debug!(
            event_type = %event.event_type.as_str(),
            selector = %event.selector,
            timestamp = event.timestamp,
            "Accepted event"
        );
        let position = self
            .events
            .partition_point(|existing| existing.timestamp <= event.timestamp);
        self.events.insert(position, event.clone());
        self.tabs.active_mut().insert(TimelineEvent::recorded(event));
        self.regenerate();
        tally.accepted += 1;
    }

    fn regenerate(&mut self) {
        self.steps = generate_steps(&self.events);
        self.regenerations += 1;
    }

    /// Add a navigation entry to the active tab. Never deduplicated.
    ///
    /// Returns the entry id, or `None` when idle.
    pub fn record_navigation(&mut self, url: &str, timestamp: u64) -> Option<String> {
        if !self.is_recording() {
            return None;
        }
        let entry = TimelineEvent::navigation(url, timestamp);
        let id = entry.id.clone();
        self.tabs.active_mut().insert(entry);
        debug!(url = %url, "Recorded navigation");
        Some(id)
    }

    /// Remove an entry from the active tab, and its raw event if it has one.
    pub fn delete_event(&mut self, id: &str) -> Result<(), RecordingError> {
        let removed = self
            .tabs
            .active_mut()
            .remove(id)
            .ok_or_else(|| RecordingError::EventNotFound(id.to_string()))?;

        if let Some(event) = removed.recorded_event() {
            if let Some(position) = self.events.iter().position(|e| e == event) {
                self.events.remove(position);
                self.regenerate();
            }
        }
        Ok(())
    }

    pub fn add_tab(&mut self, name: Option<&str>) -> String {
        self.tabs.add(name)
    }

    pub fn rename_tab(&mut self, id: &str, name: &str) -> Result<(), RecordingError> {
        self.tabs.rename(id, name)
    }

    pub fn switch_tab(&mut self, id: &str) -> Result<(), RecordingError> {
        self.tabs.switch(id)
    }

    pub fn delete_tab(&mut self, id: &str) -> Result<(), RecordingError> {
        self.tabs.delete(id).map(|_| ())
    }

    pub fn tabs(&self) -> &TimelineTabs {
        &self.tabs
    }

    /// Accepted events in ascending timestamp order.
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn steps(&self) -> &[TestStep] {
        &self.steps
    }

    /// How many times steps were regenerated since creation.
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    pub fn snapshot(&self) -> RecordingSnapshot {
        RecordingSnapshot {
            url: self.url.clone(),
            state: self.state,
            active_tab: self.tabs.active().id.clone(),
            tabs: self.tabs.list().to_vec(),
            events: self.events.clone(),
            steps: self.steps.clone(),
        }
    }

    pub fn save(
        &self,
        options: &SaveOptions,
        now: DateTime<Local>,
    ) -> Result<SavedTestPayload, RecordingError> {
        build_saved_test(&self.url, &self.events, &self.steps, options, now)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
