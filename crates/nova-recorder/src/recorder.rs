//! Document instrumentation and event emission.

use std::collections::BTreeMap;
use std::sync::Arc;

use nova_config::RecorderConfig;
use nova_dom::{css_selector, DocumentId, FrameContent, Mutation, NodeId};
use nova_protocols::{ChannelMessage, FrameContext, FrameKind, HostChannel, RecordedEvent};
use tracing::{debug, info, warn};

use crate::capture::{capture_event, DomEvent};
use crate::clock::Clock;
use crate::context::{BrowsingContext, WindowId, WindowState};
use crate::error::RecorderError;

/// Marker placed on every instrumented document.
pub const INSTALL_MARKER: &str = "__novaRecorder";

/// Rule injected into each instrumented document for the hover highlight.
const HIGHLIGHT_RULE: &str = "{ outline: 2px solid red !important; }";

/// A scheduled attempt to instrument a popup window.
#[derive(Debug, Clone, Copy)]
struct PendingWindow {
    window: WindowId,
    attempt: usize,
    due_at: u64,
}

/// Instruments documents and streams their interactions to the host.
///
/// Single-threaded by construction: every entry point takes `&mut self` and
/// runs to completion, mirroring the page's event loop.
pub struct Recorder<C: HostChannel> {
    channel: C,
    clock: Arc<dyn Clock>,
    highlight_class: String,
    retry_delays_ms: Vec<u64>,
    /// Documents with listeners attached, and the provenance of each.
    installed: BTreeMap<DocumentId, Option<FrameContext>>,
    /// Iframe elements with a load listener, keyed by their parent document.
    watched_frames: Vec<(DocumentId, NodeId)>,
    pending_windows: Vec<PendingWindow>,
}

impl<C: HostChannel> Recorder<C> {
    pub fn new(channel: C, clock: Arc<dyn Clock>, config: &RecorderConfig) -> Self {
        Self {
            channel,
            clock,
            highlight_class: config.highlight_class.clone(),
            retry_delays_ms: config.attach_retry_delays_ms.clone(),
            installed: BTreeMap::new(),
            watched_frames: Vec::new(),
            pending_windows: Vec::new(),
        }
    }

    /// Instrument the top-level document and every frame reachable from it.
    ///
    /// Returns `false` if the document already carries a recorder.
    pub fn install(&mut self, ctx: &mut BrowsingContext) -> bool {
        let top = ctx.top_document();
        match self.instrument_document(ctx, top, None) {
            Ok(installed) => {
                if installed {
                    info!("Test recorder initialized");
                } else {
                    debug!("Test recorder already initialized");
                }
                installed
            }
            Err(err) => {
                warn!("Error initializing recorder: {}", err);
                false
            }
        }
    }

    pub fn is_installed(&self, doc: DocumentId) -> bool {
        self.installed.contains_key(&doc)
    }

    /// Provenance recorded for an instrumented document.
    pub fn context_of(&self, doc: DocumentId) -> Option<&FrameContext> {
        self.installed.get(&doc).and_then(|ctx| ctx.as_ref())
    }

    /// Attach listeners to `doc`, inject the highlight style and descend into
    /// its iframes. Returns `Ok(false)` when the document was already
    /// instrumented.
    pub fn instrument_document(
        &mut self,
        ctx: &mut BrowsingContext,
        doc_id: DocumentId,
        context: Option<FrameContext>,
    ) -> Result<bool, RecorderError> {
        let doc = ctx
            .document_mut(doc_id)
            .ok_or(RecorderError::UnknownDocument(doc_id))?;
        if !doc.mark_once(INSTALL_MARKER) {
            return Ok(false);
        }

        if let Some(head) = doc.head() {
            let rule = format!(".{} {}", self.highlight_class, HIGHLIGHT_RULE);
            doc.build(head, |b| {
                b.element("style", |b| {
                    b.text(&rule);
                });
            });
        }
        let frames = doc.elements_by_tag_name(doc.root(), "iframe");
        // Existing structure is covered by the scan; observe from here on.
        doc.take_mutations();

        debug!(document = doc_id.0, url = %doc.url(), framed = context.is_some(), "Attached listeners");
        self.installed.insert(doc_id, context);

        for frame in frames {
            self.attach_to_iframe(ctx, doc_id, frame);
        }
        Ok(true)
    }

    /// Watch `iframe` for loads and enter its document if it is ready.
    fn attach_to_iframe(&mut self, ctx: &mut BrowsingContext, parent: DocumentId, iframe: NodeId) {
        if !self.watched_frames.contains(&(parent, iframe)) {
            self.watched_frames.push((parent, iframe));
        }
        if let Err(err) = self.enter_frame(ctx, parent, iframe) {
            warn!("Error accessing iframe content: {}", err);
        }
    }

    fn enter_frame(
        &mut self,
        ctx: &mut BrowsingContext,
        parent: DocumentId,
        iframe: NodeId,
    ) -> Result<(), RecorderError> {
        let parent_doc = ctx
            .document(parent)
            .ok_or(RecorderError::UnknownDocument(parent))?;
        let element = parent_doc
            .element(iframe)
            .filter(|el| el.is_iframe())
            .ok_or(RecorderError::NotAFrame)?;
        let src = element.attribute("src").unwrap_or_default().to_string();

        match element.frame {
            None | Some(FrameContent::Loading) => Ok(()),
            Some(FrameContent::CrossOrigin) => Err(RecorderError::CrossOrigin { src }),
            Some(FrameContent::Loaded(child)) => {
                // Nested frames carry the selector chain of their ancestors.
                let host = css_selector(parent_doc, iframe);
                let context = match self.context_of(parent).filter(|c| c.kind == FrameKind::Iframe) {
                    Some(outer) => outer.nested(src, host),
                    None => FrameContext::iframe(src, host),
                };
                self.instrument_document(ctx, child, Some(context))?;
                Ok(())
            }
        }
    }

    /// Load listener of a watched iframe. Unwatched frames are ignored.
    pub fn on_frame_load(&mut self, ctx: &mut BrowsingContext, parent: DocumentId, iframe: NodeId) {
        if !self.watched_frames.contains(&(parent, iframe)) {
            return;
        }
        if let Err(err) = self.enter_frame(ctx, parent, iframe) {
            warn!("Error accessing iframe content: {}", err);
        }
    }

    /// Drain the mutation logs of instrumented documents and attach to any
    /// iframe that was added, directly or inside an added subtree.
    pub fn observe_mutations(&mut self, ctx: &mut BrowsingContext) {
        let documents: Vec<DocumentId> = self.installed.keys().copied().collect();
        for doc_id in documents {
            let Some(doc) = ctx.document_mut(doc_id) else {
                continue;
            };
            let mut frames = Vec::new();
            for mutation in doc.take_mutations() {
                let Mutation::ChildAdded { child, .. } = mutation else {
                    continue;
                };
                if !doc.is_connected(child) {
                    continue;
                }
                if doc.element(child).is_some_and(|el| el.is_iframe()) {
                    frames.push(child);
                }
                frames.extend(doc.elements_by_tag_name(child, "iframe"));
            }
            for frame in frames {
                self.attach_to_iframe(ctx, doc_id, frame);
            }
        }
    }

    /// A window was opened by the page. Its content may not be ready yet, so
    /// attachment is retried on the configured schedule.
    pub fn on_window_opened(&mut self, window: WindowId) {
        let delay = self.retry_delays_ms.first().copied().unwrap_or(0);
        self.pending_windows.push(PendingWindow {
            window,
            attempt: 0,
            due_at: self.clock.now_millis() + delay,
        });
    }

    /// Earliest pending retry deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending_windows.iter().map(|p| p.due_at).min()
    }

    /// Run every window attachment whose deadline has passed. Returns the
    /// number of windows instrumented.
    pub fn tick(&mut self, ctx: &mut BrowsingContext) -> usize {
        let now = self.clock.now_millis();
        let (due, waiting): (Vec<_>, Vec<_>) = self
            .pending_windows
            .drain(..)
            .partition(|pending| pending.due_at <= now);
        self.pending_windows = waiting;

        let mut attached = 0;
        for pending in due {
            match self.attach_to_window(ctx, pending, now) {
                Ok(true) => attached += 1,
                Ok(false) => {}
                Err(err) => warn!("Error injecting into popup: {}", err),
            }
        }
        attached
    }

    fn attach_to_window(
        &mut self,
        ctx: &mut BrowsingContext,
        pending: PendingWindow,
        now: u64,
    ) -> Result<bool, RecorderError> {
        match ctx.window_state(pending.window) {
            WindowState::Ready(doc_id) => {
                let src = ctx
                    .document(doc_id)
                    .map(|doc| doc.url().to_string())
                    .unwrap_or_default();
                self.instrument_document(ctx, doc_id, Some(FrameContext::popup(src)))
            }
            WindowState::Opening => {
                let next = pending.attempt + 1;
                match self.retry_delays_ms.get(next) {
                    Some(delay) => {
                        self.pending_windows.push(PendingWindow {
                            window: pending.window,
                            attempt: next,
                            due_at: now + delay,
                        });
                        Ok(false)
                    }
                    None => Err(RecorderError::WindowNotReady {
                        window: pending.window,
                        attempts: next,
                    }),
                }
            }
            WindowState::CrossOrigin => Err(RecorderError::CrossOrigin {
                src: format!("window {}", pending.window.0),
            }),
            WindowState::Closed => Err(RecorderError::WindowClosed(pending.window)),
        }
    }

    /// Capture-phase listener of an instrumented document.
    ///
    /// Hover events toggle the highlight class. Recorded kinds are
    /// normalized, posted on the channel and returned.
    pub fn dispatch(
        &mut self,
        ctx: &mut BrowsingContext,
        doc_id: DocumentId,
        target: NodeId,
        event: DomEvent,
    ) -> Option<RecordedEvent> {
        if !self.is_installed(doc_id) {
            return None;
        }
        let doc = ctx.document_mut(doc_id)?;

        let Some(event_type) = event.event_type() else {
            if let Some(element) = doc.element_mut(target) {
                if event == DomEvent::MouseOver {
                    element.add_class(&self.highlight_class);
                } else {
                    element.remove_class(&self.highlight_class);
                }
            }
            return None;
        };

        let context = self.context_of(doc_id);
        let recorded = capture_event(doc, target, event_type, context, self.clock.now_millis())?;
        self.emit(&recorded);
        Some(recorded)
    }

    fn emit(&self, event: &RecordedEvent) {
        match ChannelMessage::recorded(event.clone()).encode() {
            Ok(payload) => self.channel.post(payload),
            Err(err) => warn!("{}", RecorderError::from(err)),
        }
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
