//! Arena-backed document tree.

use std::collections::HashSet;

use crate::error::DomError;
use crate::node::{ElementData, Namespace, Node, NodeData, NodeId};

/// Handle of a document within a browsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub usize);

/// Structural change recorded since the last [`Document::take_mutations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    ChildAdded { parent: NodeId, child: NodeId },
    ChildRemoved { parent: NodeId, child: NodeId },
}

/// A single document: the node arena, its URL, pending mutations and the
/// install markers placed on it by scripts.
#[derive(Debug, Clone)]
pub struct Document {
    url: String,
    nodes: Vec<Node>,
    markers: HashSet<String>,
    mutations: Vec<Mutation>,
}

impl Document {
    /// A document with an `<html><head></head><body></body></html>` skeleton.
    pub fn new(url: impl Into<String>) -> Self {
        let mut doc = Self::empty(url);
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.attach(doc.root(), html);
        doc.attach(html, head);
        doc.attach(html, body);
        doc.mutations.clear();
        doc
    }

    /// A document with no element children.
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            nodes: vec![Node::new(NodeData::Document)],
            markers: HashSet::new(),
            mutations: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).map(|node| &node.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(id.0).map(|node| &mut node.data) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Create a detached HTML element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create_element_ns(tag, Namespace::Html)
    }

    pub fn create_element_ns(&mut self, tag: &str, namespace: Namespace) -> NodeId {
        self.push(NodeData::Element(ElementData::with_namespace(tag, namespace)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node::new(data));
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` to `parent`, moving it if it is already attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_node = self.nodes.get(parent.0).ok_or(DomError::UnknownNode(parent.0))?;
        if matches!(parent_node.data, NodeData::Text(_)) {
            return Err(DomError::NotAContainer(parent.0));
        }
        let child_node = self.nodes.get(child.0).ok_or(DomError::UnknownNode(child.0))?;
        if matches!(child_node.data, NodeData::Document) {
            return Err(DomError::HierarchyRequest("a document cannot be a child".to_string()));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest(format!(
                "node {} is an ancestor of {}",
                child.0, parent.0
            )));
        }

        if self.nodes[child.0].parent.is_some() {
            self.remove(child)?;
        }
        self.attach(parent, child);
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.mutations.push(Mutation::ChildAdded { parent, child });
    }

    /// Detach `child` from its parent. Detaching a parentless node is a no-op.
    pub fn remove(&mut self, child: NodeId) -> Result<(), DomError> {
        let node = self.nodes.get_mut(child.0).ok_or(DomError::UnknownNode(child.0))?;
        if let Some(parent) = node.parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != child);
            self.mutations.push(Mutation::ChildRemoved { parent, child });
        }
        Ok(())
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    /// Parent, if it is an element.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|parent| self.is_element(*parent))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|s| *s == id)?;
        siblings[..position]
            .iter()
            .rev()
            .copied()
            .find(|s| self.is_element(*s))
    }

    /// The root element (normally `<html>`).
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root()).next()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.child_with_tag(self.document_element()?, "head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.child_with_tag(self.document_element()?, "body")
    }

    fn child_with_tag(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.element_children(parent)
            .find(|child| self.element(*child).is_some_and(|el| el.tag == tag))
    }

    /// Descendants of `id` in tree order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Elements named `tag` below `scope`, in tree order.
    pub fn elements_by_tag_name(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|el| el.tag == tag))
            .collect()
    }

    /// First connected element whose `id` attribute equals `value`.
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|id| self.element(*id).and_then(|el| el.attribute("id")) == Some(value))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(NodeData::Text(text)) = self.data(id) {
            return text.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match self.data(node) {
                Some(NodeData::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether `id` is reachable from the document node.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(id) && self.is_inclusive_ancestor(self.root(), id)
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) -> Result<(), DomError> {
        let element = self.element_mut(id).ok_or(DomError::UnknownNode(id.0))?;
        element.value = Some(value.into());
        Ok(())
    }

    /// Drain the mutation log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    /// Place `key` on the document. Returns `false` if it was already there.
    pub fn mark_once(&mut self, key: &str) -> bool {
        self.markers.insert(key.to_string())
    }

    pub fn has_marker(&self, key: &str) -> bool {
        self.markers.contains(key)
    }
}
