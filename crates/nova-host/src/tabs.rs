//! Named timeline sub-collections.

use nova_protocols::{RecordingError, TimelineEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One named timeline, kept in descending timestamp order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineTab {
    pub id: String,
    pub name: String,
    events: Vec<TimelineEvent>,
}

impl TimelineTab {
    fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            events: Vec::new(),
        }
    }

    /// Insert keeping most-recent-first order. Among equal timestamps the
    /// later arrival is listed first.
    pub fn insert(&mut self, event: TimelineEvent) {
        let position = self
            .events
            .partition_point(|existing| existing.timestamp > event.timestamp);
        self.events.insert(position, event);
    }

    pub fn remove(&mut self, event_id: &str) -> Option<TimelineEvent> {
        let position = self.events.iter().position(|e| e.id == event_id)?;
        Some(self.events.remove(position))
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Events, most recent first.
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// The set of timelines. Exactly one is active and receives new events.
#[derive(Debug, Clone)]
pub struct TimelineTabs {
    tabs: Vec<TimelineTab>,
    active: usize,
    created: usize,
}

impl Default for TimelineTabs {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineTabs {
    /// Start with a single active tab named "Timeline 1".
    pub fn new() -> Self {
        let mut tabs = Self {
            tabs: Vec::new(),
            active: 0,
            created: 0,
        };
        tabs.push(None);
        tabs
    }

    fn push(&mut self, name: Option<&str>) -> usize {
        self.created += 1;
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Timeline {}", self.created),
        };
        self.tabs.push(TimelineTab::new(name));
        self.tabs.len() - 1
    }

    /// Create a tab and make it active. Returns its id.
    pub fn add(&mut self, name: Option<&str>) -> String {
        let index = self.push(name);
        self.active = index;
        self.tabs[index].id.clone()
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<(), RecordingError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RecordingError::EmptyTabName);
        }
        let index = self.index_of(id)?;
        self.tabs[index].name = name.to_string();
        Ok(())
    }

    /// Make `id` the active tab. Already-accepted events are left as they are.
    pub fn switch(&mut self, id: &str) -> Result<(), RecordingError> {
        self.active = self.index_of(id)?;
        Ok(())
    }

    /// Delete a tab. The last remaining tab cannot be deleted.
    pub fn delete(&mut self, id: &str) -> Result<TimelineTab, RecordingError> {
        let index = self.index_of(id)?;
        if self.tabs.len() == 1 {
            return Err(RecordingError::LastTab);
        }
        let removed = self.tabs.remove(index);
        if self.active > index || self.active == self.tabs.len() {
            self.active -= 1;
        }
        Ok(removed)
    }

    fn index_of(&self, id: &str) -> Result<usize, RecordingError> {
        self.tabs
            .iter()
            .position(|tab| tab.id == id)
            .ok_or_else(|| RecordingError::TabNotFound(id.to_string()))
    }

    pub fn active(&self) -> &TimelineTab {
        &self.tabs[self.active]
    }

    pub fn active_mut(&mut self) -> &mut TimelineTab {
        &mut self.tabs[self.active]
    }

    pub fn get(&self, id: &str) -> Option<&TimelineTab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn list(&self) -> &[TimelineTab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}
