//! Closure-based tree construction.
//!
//! ```
//! use nova_dom::Document;
//!
//! let mut doc = Document::new("https://app.test/login");
//! let body = doc.body().unwrap();
//! let form = doc.build(body, |b| {
//!     b.element("form", |b| {
//!         b.element("button", |b| {
//!             b.attr("id", "login-button").text("Login");
//!         });
//!     })
//! });
//! assert_eq!(doc.element(form).unwrap().tag, "form");
//! ```

use crate::document::Document;
use crate::node::{FrameContent, Namespace, NodeId};

/// Builds children under one element.
pub struct ElementBuilder<'a> {
    doc: &'a mut Document,
    node: NodeId,
}

impl<'a> ElementBuilder<'a> {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn attr(&mut self, name: &str, value: &str) -> &mut Self {
        if let Some(element) = self.doc.element_mut(self.node) {
            element.set_attribute(name, value);
        }
        self
    }

    /// Set the live form value.
    pub fn value(&mut self, value: &str) -> &mut Self {
        if let Some(element) = self.doc.element_mut(self.node) {
            element.value = Some(value.to_string());
        }
        self
    }

    pub fn frame(&mut self, content: FrameContent) -> &mut Self {
        if let Some(element) = self.doc.element_mut(self.node) {
            element.frame = Some(content);
        }
        self
    }

    pub fn text(&mut self, text: &str) -> &mut Self {
        let child = self.doc.create_text(text);
        self.append(child);
        self
    }

    /// Append an HTML child element and populate it with `f`.
    pub fn element<F>(&mut self, tag: &str, f: F) -> NodeId
    where
        F: FnOnce(&mut ElementBuilder<'_>),
    {
        self.element_ns(tag, Namespace::Html, f)
    }

    pub fn element_ns<F>(&mut self, tag: &str, namespace: Namespace, f: F) -> NodeId
    where
        F: FnOnce(&mut ElementBuilder<'_>),
    {
        let child = self.doc.create_element_ns(tag, namespace);
        self.append(child);
        f(&mut ElementBuilder {
            doc: &mut *self.doc,
            node: child,
        });
        child
    }

    /// Append a childless element.
    pub fn leaf(&mut self, tag: &str) -> NodeId {
        self.element(tag, |_| {})
    }

    fn append(&mut self, child: NodeId) {
        // Freshly created nodes cannot form a cycle.
        let _ = self.doc.append_child(self.node, child);
    }
}

impl Document {
    /// Populate `parent` with `f`, returning whatever `f` returns.
    pub fn build<R, F>(&mut self, parent: NodeId, f: F) -> R
    where
        F: FnOnce(&mut ElementBuilder<'_>) -> R,
    {
        f(&mut ElementBuilder {
            doc: self,
            node: parent,
        })
    }
}
