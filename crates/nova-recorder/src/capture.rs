//! DOM event normalization.

use nova_dom::{css_selector, framed_selector, structural_path, Document, NodeId};
use nova_protocols::{EventType, FrameContext, FrameKind, RecordedEvent};

/// DOM events the recorder listens for in capture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEvent {
    Click,
    Input,
    Change,
    Submit,
    /// Highlight only.
    MouseOver,
    /// Highlight only.
    MouseOut,
}

impl DomEvent {
    /// Parse a DOM event name (`click`, `mouseover`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mouseover" => Some(Self::MouseOver),
            "mouseout" => Some(Self::MouseOut),
            other => EventType::from_dom_name(other).map(Self::from),
        }
    }

    /// The recorded type, or `None` for cosmetic events.
    pub fn event_type(self) -> Option<EventType> {
        match self {
            Self::Click => Some(EventType::Click),
            Self::Input => Some(EventType::Input),
            Self::Change => Some(EventType::Change),
            Self::Submit => Some(EventType::Submit),
            Self::MouseOver | Self::MouseOut => None,
        }
    }
}

impl From<EventType> for DomEvent {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Click => Self::Click,
            EventType::Input => Self::Input,
            EventType::Change => Self::Change,
            EventType::Submit => Self::Submit,
        }
    }
}

/// Build the event record for `target`.
///
/// Returns `None` when `target` is not an element. Iframe provenance is
/// folded into the selector; popup provenance only travels in `context`.
pub fn capture_event(
    doc: &Document,
    target: NodeId,
    event_type: EventType,
    context: Option<&FrameContext>,
    timestamp: u64,
) -> Option<RecordedEvent> {
    let element = doc.element(target)?;

    let frame_selector = context
        .filter(|ctx| ctx.kind == FrameKind::Iframe)
        .map(|ctx| ctx.selector.as_str());
    let selector = framed_selector(frame_selector, &css_selector(doc, target));

    let mut event = RecordedEvent::new(event_type, element.tag.clone(), timestamp)
        .with_selector(selector)
        .with_xpath(structural_path(doc, target))
        .with_text(doc.text_content(target).trim());

    if let Some(id) = element.non_empty_attribute("id") {
        event = event.with_id(id);
    }
    if let Some(name) = element.non_empty_attribute("name") {
        event = event.with_name(name);
    }
    if element.is_form_control() {
        event = event.with_value(element.value.clone().unwrap_or_default());
    }
    if element.accepts_placeholder() {
        if let Some(placeholder) = element.non_empty_attribute("placeholder") {
            event = event.with_placeholder(placeholder);
        }
    }
    if let Some(context) = context {
        event = event.with_context(context.clone());
    }

    Some(event)
}
