//! Recorded interaction events.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Maximum number of characters of element text used in titles and descriptions.
const TEXT_PREVIEW_CHARS: usize = 40;

/// Interaction kinds emitted by the recorder.
///
/// Navigation is synthesized by the host and never appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Click,
    Input,
    Change,
    Submit,
}

impl EventType {
    /// All recorder-emitted event types, in listener registration order.
    pub const ALL: [EventType; 4] = [
        EventType::Click,
        EventType::Input,
        EventType::Change,
        EventType::Submit,
    ];

    /// Wire name of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Input => "input",
            EventType::Change => "change",
            EventType::Submit => "submit",
        }
    }

    /// Parse a DOM event name.
    pub fn from_dom_name(name: &str) -> Option<Self> {
        match name {
            "click" => Some(EventType::Click),
            "input" => Some(EventType::Input),
            "change" => Some(EventType::Change),
            "submit" => Some(EventType::Submit),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a frame-hosted event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Iframe,
    Popup,
}

/// Frame provenance attached to events that did not originate in the top-level document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameContext {
    #[serde(rename = "type")]
    pub kind: FrameKind,
    /// Source URL of the frame or popup.
    #[serde(default)]
    pub src: String,
    /// Locator of the hosting iframe element in its parent document. Empty for popups.
    #[serde(default)]
    pub selector: String,
    /// Hosting iframe selectors from the top document inward. Only present
    /// for frames nested inside another iframe.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<String>,
}

impl FrameContext {
    /// Context for a document hosted by an iframe element.
    pub fn iframe(src: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Iframe,
            src: src.into(),
            selector: selector.into(),
            frames: Vec::new(),
        }
    }

    /// Context for an iframe hosted inside the document this context
    /// describes. `selector` locates the iframe element in that document.
    pub fn nested(&self, src: impl Into<String>, selector: impl Into<String>) -> Self {
        let selector = selector.into();
        let mut frames = self.frame_chain();
        frames.push(selector.clone());
        Self {
            kind: FrameKind::Iframe,
            src: src.into(),
            selector: format!("{} {}", self.selector, selector),
            frames,
        }
    }

    /// Selectors of the iframes to switch through, one per document level.
    pub fn frame_chain(&self) -> Vec<String> {
        match self.kind {
            FrameKind::Popup => Vec::new(),
            FrameKind::Iframe if self.frames.is_empty() => vec![self.selector.clone()],
            FrameKind::Iframe => self.frames.clone(),
        }
    }

    /// Context for a document opened in a new window.
    pub fn popup(src: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Popup,
            src: src.into(),
            selector: String::new(),
            frames: Vec::new(),
        }
    }
}

/// One observed interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Short CSS-like locator, not guaranteed unique.
    #[serde(default)]
    pub selector: String,
    /// Absolute structural path from the document root.
    #[serde(default)]
    pub xpath: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Lower-cased tag name.
    pub tag_name: String,
    /// Current form value for input/select/textarea elements.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Trimmed text content.
    #[serde(default)]
    pub text: String,
    /// Capture-time clock reading in milliseconds.
    pub timestamp: u64,
    #[serde(default)]
    pub context: Option<FrameContext>,
}

impl RecordedEvent {
    /// Create an event with only the mandatory fields set.
    pub fn new(event_type: EventType, tag_name: impl Into<String>, timestamp: u64) -> Self {
        Self {
            event_type,
            selector: String::new(),
            xpath: String::new(),
            id: None,
            name: None,
            tag_name: tag_name.into(),
            value: None,
            placeholder: None,
            text: String::new(),
            timestamp,
            context: None,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn with_xpath(mut self, xpath: impl Into<String>) -> Self {
        self.xpath = xpath.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_context(mut self, context: FrameContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Reject events that cannot be shown on a timeline or turned into a step.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.tag_name.trim().is_empty() {
            return Err(ProtocolError::InvalidEvent("tagName is empty".to_string()));
        }
        if self.timestamp == 0 {
            return Err(ProtocolError::InvalidEvent("timestamp is missing".to_string()));
        }
        Ok(())
    }

    /// Whether this event came from an iframe or popup.
    pub fn is_framed(&self) -> bool {
        self.context.is_some()
    }

    /// Short human-readable description of the target element.
    ///
    /// Prefers visible text, then id, name, placeholder and finally the selector.
    pub fn describe_target(&self) -> String {
        if !self.text.is_empty() {
            return format!("{} \"{}\"", self.tag_name, preview(&self.text));
        }
        if let Some(id) = self.id.as_deref().filter(|s| !s.is_empty()) {
            return format!("{}#{}", self.tag_name, id);
        }
        if let Some(name) = self.name.as_deref().filter(|s| !s.is_empty()) {
            return format!("{}[name={}]", self.tag_name, name);
        }
        if let Some(placeholder) = self.placeholder.as_deref().filter(|s| !s.is_empty()) {
            return format!("{} ({})", self.tag_name, preview(placeholder));
        }
        if !self.selector.is_empty() {
            return self.selector.clone();
        }
        self.tag_name.clone()
    }

    /// One-line title such as `Click on button "Login"`.
    pub fn summary(&self) -> String {
        let target = self.describe_target();
        let value = self.value.as_deref().map(preview).unwrap_or_default();
        match self.event_type {
            EventType::Click => format!("Click on {}", target),
            EventType::Input => format!("Type \"{}\" into {}", value, target),
            EventType::Change => format!("Change {} to \"{}\"", target, value),
            EventType::Submit => format!("Submit {}", target),
        }
    }
}

/// Collapse whitespace and cut text to a displayable preview.
pub(crate) fn preview(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > TEXT_PREVIEW_CHARS {
        let cut: String = collapsed.chars().take(TEXT_PREVIEW_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        collapsed
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
