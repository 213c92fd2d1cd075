//! Element identification.
//!
//! Every recorded event carries two locators computed independently of each
//! other:
//!
//! - a short CSS selector that prefers stable attributes
//!   (`data-testid`, then `id`, `name`, `aria-label`) and falls back to an
//!   `nth-of-type` chain up to (excluding) `<body>`;
//! - an absolute structural path `/html[1]/body[1]/...` where every segment
//!   is indexed among all same-tag siblings.
//!
//! Siblings are compared by local name and namespace, so an inline SVG `<a>`
//! does not shift the index of an HTML `<a>` next to it.

use crate::document::Document;
use crate::node::{ElementData, Namespace, NodeId};

/// Attribute tiers tried in order before falling back to position.
const ATTRIBUTE_TIERS: [&str; 4] = ["data-testid", "id", "name", "aria-label"];

/// Best-effort, short locator for `target`. Not guaranteed to be unique.
///
/// Returns an empty string for non-elements and for a bare `<body>`.
pub fn css_selector(doc: &Document, target: NodeId) -> String {
    let Some(element) = doc.element(target) else {
        return String::new();
    };

    for attribute in ATTRIBUTE_TIERS {
        if let Some(value) = element.non_empty_attribute(attribute) {
            return match attribute {
                "id" => format!("#{}", value),
                _ => format!("[{}=\"{}\"]", attribute, value),
            };
        }
    }

    positional_selector(doc, target)
}

/// Prefix `selector` with the selector of the hosting iframe, if any.
pub fn framed_selector(frame_selector: Option<&str>, selector: &str) -> String {
    match frame_selector {
        Some(frame) if !frame.is_empty() => format!("{} {}", frame, selector),
        _ => selector.to_string(),
    }
}

fn positional_selector(doc: &Document, target: NodeId) -> String {
    let mut segments = Vec::new();
    let mut current = Some(target);

    while let Some(id) = current {
        let Some(element) = doc.element(id) else {
            break;
        };
        if is_body(element) {
            break;
        }

        let mut segment = element.tag.clone();
        if let Some(parent) = doc.parent_element(id) {
            let same_kind: Vec<NodeId> = doc
                .element_children(parent)
                .filter(|sibling| doc.element(*sibling).is_some_and(|s| s.same_kind(element)))
                .collect();
            if same_kind.len() > 1 {
                if let Some(position) = same_kind.iter().position(|sibling| *sibling == id) {
                    segment.push_str(&format!(":nth-of-type({})", position + 1));
                }
            }
        }
        segments.push(segment);
        current = doc.parent_element(id);
    }

    segments.reverse();
    segments.join(" > ")
}

fn is_body(element: &ElementData) -> bool {
    element.namespace == Namespace::Html && element.tag == "body"
}

/// Absolute positional path from the root element to `target`.
///
/// The root element yields `/html[1]`. Non-elements and elements not
/// connected to the document yield an empty string.
pub fn structural_path(doc: &Document, target: NodeId) -> String {
    if !doc.is_element(target) || !doc.is_connected(target) {
        return String::new();
    }

    let mut segments = Vec::new();
    let mut current = Some(target);
    while let Some(id) = current {
        let Some(element) = doc.element(id) else {
            break;
        };
        segments.push(format!("{}[{}]", element.tag, same_kind_index(doc, id, element)));
        current = doc.parent_element(id);
    }

    segments.reverse();
    format!("/{}", segments.join("/"))
}

/// 1-based position of `id` among preceding same-kind element siblings.
fn same_kind_index(doc: &Document, id: NodeId, element: &ElementData) -> usize {
    let mut index = 1;
    let mut sibling = doc.previous_element_sibling(id);
    while let Some(prev) = sibling {
        if doc.element(prev).is_some_and(|s| s.same_kind(element)) {
            index += 1;
        }
        sibling = doc.previous_element_sibling(prev);
    }
    index
}

#[cfg(test)]
#[path = "identify_tests.rs"]
mod tests;
