//! End-to-end: the in-memory recorder posts on a channel drained by a
//! running host processor.

use std::sync::Arc;
use std::time::Duration;

use nova_config::RecorderConfig;
use nova_dom::{Document, DocumentId, ElementBuilder, NodeId};
use nova_host::{HostHandle, HostProcessor, RecordingSession, SaveOptions};
use nova_protocols::{ChannelSender, EventType, FrameContext};
use nova_recorder::{BrowsingContext, Clock, DomEvent, ManualClock, Recorder};
use tokio_util::sync::CancellationToken;

struct Page {
    ctx: BrowsingContext,
    recorder: Recorder<ChannelSender>,
    clock: Arc<ManualClock>,
}

impl Page {
    fn top(&self) -> DocumentId {
        self.ctx.top_document()
    }

    fn add(&mut self, doc: DocumentId, f: impl FnOnce(&mut ElementBuilder<'_>) -> NodeId) -> NodeId {
        let document = self.ctx.document_mut(doc).unwrap();
        let body = document.body().unwrap();
        document.build(body, f)
    }

    fn install(&mut self) {
        assert!(self.recorder.install(&mut self.ctx));
    }

    fn fire(&mut self, doc: DocumentId, target: NodeId, event: DomEvent, at: u64) {
        self.clock.set(at);
        self.recorder.dispatch(&mut self.ctx, doc, target, event);
    }

    fn type_text(&mut self, doc: DocumentId, target: NodeId, value: &str, at: u64) {
        self.ctx.document_mut(doc).unwrap().set_value(target, value).unwrap();
        self.fire(doc, target, DomEvent::Input, at);
    }
}

fn setup(url: &str) -> (Page, HostHandle) {
    let config = RecorderConfig::default();
    let (sender, rx) = ChannelSender::pair();
    let clock = Arc::new(ManualClock::new(1000));
    let dyn_clock: Arc<dyn Clock> = clock.clone();

    let page = Page {
        ctx: BrowsingContext::new(Document::new(url)),
        recorder: Recorder::new(sender, dyn_clock, &config),
        clock,
    };

    let session = RecordingSession::new(&config, "about:blank");
    let (host, _task) = HostProcessor::spawn(session, rx, CancellationToken::new());
    (page, host)
}

fn input_with_id(id: &'static str) -> impl FnOnce(&mut ElementBuilder<'_>) -> NodeId {
    move |b| {
        b.element("input", |b| {
            b.attr("id", id);
        })
    }
}

fn button(id: &'static str, label: &'static str) -> impl FnOnce(&mut ElementBuilder<'_>) -> NodeId {
    move |b| {
        b.element("button", |b| {
            b.attr("id", id).text(label);
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_login_flow() {
    let (mut page, host) = setup("https://app.test/login");
    let top = page.top();
    let email = page.add(top, input_with_id("email"));
    let login = page.add(top, button("login-button", "Login"));
    page.install();
    host.start("https://app.test/login").await.unwrap();

    page.type_text(top, email, "b", 1000);
    tokio::time::sleep(Duration::from_millis(100)).await;
    page.type_text(top, email, "bob", 1300);
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // One physical click, delivered twice.
    page.fire(top, login, DomEvent::Click, 4000);
    page.fire(top, login, DomEvent::Click, 4100);

    let snapshot = host.snapshot().await.unwrap();
    let kinds: Vec<EventType> = snapshot.events.iter().map(|e| e.event_type).collect();
    assert_eq!(kinds, vec![EventType::Input, EventType::Click]);
    assert_eq!(snapshot.events[0].value.as_deref(), Some("bob"));
    assert_eq!(snapshot.events[1].selector, "#login-button");
    assert_eq!(snapshot.events[1].xpath, "/html[1]/body[1]/button[1]");
    assert_eq!(snapshot.steps.len(), 2);
    assert!(snapshot.steps[0].code.contains("send_keys(\"bob\")"));

    let payload = host.save(SaveOptions::for_project("p-1")).await.unwrap();
    assert_eq!(payload.url, "https://app.test/login");
    assert_eq!(payload.events.len(), 2);
}

#[tokio::test]
async fn test_events_before_start_are_dropped() {
    let (mut page, host) = setup("https://app.test/");
    let top = page.top();
    let go = page.add(top, button("go", "Go"));
    page.install();

    page.fire(top, go, DomEvent::Click, 1000);
    host.start("https://app.test/").await.unwrap();
    page.fire(top, go, DomEvent::Click, 5000);
    host.stop().await.unwrap();
    page.fire(top, go, DomEvent::Click, 9000);

    let snapshot = host.snapshot().await.unwrap();
    assert_eq!(snapshot.events.len(), 1);
    assert_eq!(snapshot.events[0].timestamp, 5000);
}

#[tokio::test]
async fn test_display_and_step_order() {
    let (mut page, host) = setup("https://app.test/");
    let top = page.top();
    let ids = ["first", "second", "third"];
    let buttons: Vec<NodeId> = ids.iter().map(|id| page.add(top, button(id, "Next"))).collect();
    page.install();
    host.start("https://app.test/").await.unwrap();

    for (i, node) in buttons.iter().enumerate() {
        page.fire(top, *node, DomEvent::Click, 1000 * (i as u64 + 1));
    }

    let snapshot = host.snapshot().await.unwrap();
    let displayed: Vec<String> = snapshot
        .active()
        .unwrap()
        .events()
        .iter()
        .filter_map(|e| e.recorded_event())
        .filter_map(|e| e.id.clone())
        .collect();
    assert_eq!(displayed, vec!["third", "second", "first"]);

    let steps: Vec<&str> = snapshot.steps.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(
        steps,
        vec![
            "driver.find_element(By.ID, \"first\").click()",
            "driver.find_element(By.ID, \"second\").click()",
            "driver.find_element(By.ID, \"third\").click()",
        ]
    );
}

#[tokio::test]
async fn test_iframe_interaction_carries_frame_context() {
    let (mut page, host) = setup("https://shop.test/");
    let top = page.top();
    let frame = page.add(top, |b| {
        b.element("iframe", |b| {
            b.attr("id", "checkout").attr("src", "https://shop.test/pay");
        })
    });
    let inner = page
        .ctx
        .load_frame(top, frame, Document::new("https://shop.test/pay"))
        .unwrap();
    let pay = page.add(inner, |b| {
        b.element("button", |b| {
            b.text("Pay");
        })
    });
    page.install();
    host.start("https://shop.test/").await.unwrap();

    page.fire(inner, pay, DomEvent::Click, 2000);

    let snapshot = host.snapshot().await.unwrap();
    let event = &snapshot.events[0];
    assert_eq!(event.selector, "#checkout button");
    assert_eq!(
        event.context,
        Some(FrameContext::iframe("https://shop.test/pay", "#checkout"))
    );
    assert_eq!(
        snapshot.steps[0].code,
        "driver.switch_to.frame(driver.find_element(By.CSS_SELECTOR, \"#checkout\"))\n\
         driver.find_element(By.CSS_SELECTOR, \"button\").click()\n\
         driver.switch_to.default_content()"
    );
}
