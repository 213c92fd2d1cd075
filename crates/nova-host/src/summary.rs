//! Per-tab action summaries.
//!
//! Code and report generators consume a recording as short natural-language
//! fragments, one per timeline event, in the order the user performed them.

use nova_protocols::{EventType, TimelineEntry, TimelineEvent};

use crate::tabs::TimelineTab;

/// A single fragment: verb, optional quoted text, optional element id and
/// optional structural path.
///
/// `click "Login" on element login-button at path: /html[1]/body[1]/button[1]`
pub fn action_fragment(event: &TimelineEvent) -> String {
    let mut fragment = event.action().to_string();

    match &event.entry {
        TimelineEntry::Navigation { url } => {
            if !url.is_empty() {
                fragment.push_str(&format!(" \"{}\"", url));
            }
        }
        TimelineEntry::Recorded { event: recorded } => {
            let quoted = match recorded.event_type {
                EventType::Input | EventType::Change => recorded.value.as_deref().unwrap_or_default(),
                EventType::Click | EventType::Submit => recorded.text.as_str(),
            };
            if !quoted.is_empty() {
                fragment.push_str(&format!(" \"{}\"", quoted));
            }
            if let Some(id) = recorded.id.as_deref().filter(|id| !id.is_empty()) {
                fragment.push_str(&format!(" on element {}", id));
            }
            if !recorded.xpath.is_empty() {
                fragment.push_str(&format!(" at path: {}", recorded.xpath));
            }
        }
    }

    fragment
}

/// Fragments of one tab in chronological order.
pub fn action_summary(tab: &TimelineTab) -> Vec<String> {
    tab.events().iter().rev().map(action_fragment).collect()
}

/// Text block per tab, as handed to the generation services.
pub fn format_summaries(tabs: &[TimelineTab]) -> String {
    tabs.iter()
        .map(|tab| {
            let lines: Vec<String> = action_summary(tab)
                .into_iter()
                .enumerate()
                .map(|(i, fragment)| format!("{}. {}", i + 1, fragment))
                .collect();
            if lines.is_empty() {
                format!("{}:\n(no actions)", tab.name)
            } else {
                format!("{}:\n{}", tab.name, lines.join("\n"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
