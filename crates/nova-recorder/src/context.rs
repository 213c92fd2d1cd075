//! Documents and windows reachable from one top-level page.

use nova_dom::{Document, DocumentId, FrameContent, NodeId};

/// Handle of a window. `WindowId(0)` is the top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub usize);

/// Lifecycle of a window opened by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Opened, but its document is not available yet.
    Opening,
    Ready(DocumentId),
    /// Opened on another origin; its document cannot be entered.
    CrossOrigin,
    Closed,
}

/// Owns every document of one page: the top-level document, iframe
/// documents and popup documents.
#[derive(Debug)]
pub struct BrowsingContext {
    documents: Vec<Document>,
    windows: Vec<WindowState>,
}

impl BrowsingContext {
    pub fn new(top: Document) -> Self {
        Self {
            documents: vec![top],
            windows: vec![WindowState::Ready(DocumentId(0))],
        }
    }

    pub fn top_window(&self) -> WindowId {
        WindowId(0)
    }

    pub fn top_document(&self) -> DocumentId {
        DocumentId(0)
    }

    pub fn add_document(&mut self, document: Document) -> DocumentId {
        self.documents.push(document);
        DocumentId(self.documents.len() - 1)
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id.0)
    }

    pub fn document_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(id.0)
    }

    /// Load `document` into `iframe` of `parent` and return its handle.
    ///
    /// Returns `None` if `iframe` is not an iframe element of `parent`.
    pub fn load_frame(
        &mut self,
        parent: DocumentId,
        iframe: NodeId,
        document: Document,
    ) -> Option<DocumentId> {
        let is_frame = self
            .document(parent)
            .and_then(|doc| doc.element(iframe))
            .is_some_and(|el| el.is_iframe());
        if !is_frame {
            return None;
        }
        let id = self.add_document(document);
        self.set_frame_content(parent, iframe, FrameContent::Loaded(id));
        Some(id)
    }

    pub fn set_frame_content(&mut self, parent: DocumentId, iframe: NodeId, content: FrameContent) {
        if let Some(element) = self
            .document_mut(parent)
            .and_then(|doc| doc.element_mut(iframe))
        {
            element.frame = Some(content);
        }
    }

    /// Register a window whose document is not ready yet.
    pub fn open_window(&mut self) -> WindowId {
        self.windows.push(WindowState::Opening);
        WindowId(self.windows.len() - 1)
    }

    /// Give an opening window its document.
    pub fn window_ready(&mut self, window: WindowId, document: Document) -> DocumentId {
        let id = self.add_document(document);
        self.set_window_state(window, WindowState::Ready(id));
        id
    }

    pub fn set_window_state(&mut self, window: WindowId, state: WindowState) {
        if let Some(slot) = self.windows.get_mut(window.0) {
            *slot = state;
        }
    }

    pub fn window_state(&self, window: WindowId) -> WindowState {
        self.windows
            .get(window.0)
            .copied()
            .unwrap_or(WindowState::Closed)
    }
}
