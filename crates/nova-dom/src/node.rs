//! Node storage types.

use crate::document::DocumentId;

/// Index of a node inside its owning [`Document`](crate::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element namespace, used when numbering same-tag siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
    MathMl,
}

/// What an `<iframe>` element currently hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameContent {
    /// The frame has not finished loading.
    Loading,
    /// A same-origin document the recorder may enter.
    Loaded(DocumentId),
    /// A document whose contents are not accessible from the parent.
    CrossOrigin,
}

/// Element payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Local name, lower-cased.
    pub tag: String,
    pub namespace: Namespace,
    pub attributes: Vec<(String, String)>,
    /// Live form value for `input`, `select` and `textarea`.
    pub value: Option<String>,
    pub frame: Option<FrameContent>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self::with_namespace(tag, Namespace::Html)
    }

    pub fn with_namespace(tag: &str, namespace: Namespace) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            namespace,
            attributes: Vec::new(),
            value: None,
            frame: None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value, treating an empty string as absent.
    pub fn non_empty_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name).filter(|value| !value.is_empty())
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(key, _)| key != name);
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attribute("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attribute("class", joined);
    }

    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        let joined = remaining.join(" ");
        if joined.is_empty() {
            self.remove_attribute("class");
        } else {
            self.set_attribute("class", joined);
        }
    }

    /// Whether the element carries a live form value.
    pub fn is_form_control(&self) -> bool {
        self.namespace == Namespace::Html && matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }

    /// Whether the element exposes a `placeholder` property.
    pub fn accepts_placeholder(&self) -> bool {
        self.namespace == Namespace::Html && matches!(self.tag.as_str(), "input" | "textarea")
    }

    pub fn is_iframe(&self) -> bool {
        self.namespace == Namespace::Html && self.tag == "iframe"
    }

    /// Same tag in the same namespace.
    pub(crate) fn same_kind(&self, other: &ElementData) -> bool {
        self.namespace == other.namespace && self.tag == other.tag
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
}

impl Node {
    pub fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data,
        }
    }
}
