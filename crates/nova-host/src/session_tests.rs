use std::time::Duration;

use chrono::TimeZone;
use nova_protocols::FrameContext;

use super::*;

fn session() -> RecordingSession {
    RecordingSession::new(&RecorderConfig::default(), "about:blank")
}

fn recording() -> RecordingSession {
    let mut session = session();
    session.start("https://app.test/login").unwrap();
    session
}

fn raw(event: RecordedEvent) -> String {
    ChannelMessage::recorded(event).encode().unwrap()
}

fn login_click(ts: u64) -> RecordedEvent {
    RecordedEvent::new(EventType::Click, "button", ts)
        .with_selector("#login-button")
        .with_xpath("/html[1]/body[1]/div[1]/button[1]")
        .with_id("login-button")
        .with_text("Login")
}

fn click_on(selector: &str, ts: u64) -> RecordedEvent {
    RecordedEvent::new(EventType::Click, "a", ts).with_selector(selector)
}

fn keystroke(value: &str, ts: u64) -> RecordedEvent {
    RecordedEvent::new(EventType::Input, "input", ts)
        .with_selector("#email")
        .with_id("email")
        .with_value(value)
}

#[test]
fn test_start_requires_a_loaded_page() {
    let mut session = session();
    assert_eq!(session.start("about:blank"), Err(RecordingError::NoPageLoaded));
    assert_eq!(session.start(""), Err(RecordingError::NoPageLoaded));
    assert_eq!(session.state(), SessionState::Idle);

    session.start("https://app.test/").unwrap();
    assert!(session.is_recording());
    assert_eq!(session.url(), "https://app.test/");
}

#[test]
fn test_first_click_is_accepted_and_generates_a_step() {
    let mut session = recording();
    let before = session.regenerations();

    let outcome = session.ingest(&raw(login_click(1000)), Instant::now());

    assert_eq!(
        outcome,
        IngestOutcome::Processed {
            accepted: 1,
            suppressed: 0,
            buffered: false
        }
    );
    assert_eq!(session.tabs().active().len(), 1);
    assert_eq!(session.steps().len(), 1);
    assert_eq!(session.regenerations(), before + 1);
}

#[test]
fn test_repeated_click_within_window_is_suppressed() {
    let mut session = recording();
    let now = Instant::now();
    session.ingest(&raw(login_click(1000)), now);

    let outcome = session.ingest(&raw(login_click(1200)), now);
    assert_eq!(
        outcome,
        IngestOutcome::Processed {
            accepted: 0,
            suppressed: 1,
            buffered: false
        }
    );
    assert_eq!(session.events().len(), 1);
}

#[test]
fn test_change_after_click_is_suppressed() {
    let mut session = recording();
    let click = RecordedEvent::new(EventType::Click, "input", 1000)
        .with_selector("#agree")
        .with_xpath("/html[1]/body[1]/input[1]")
        .with_value("on");
    let mut change = click.clone();
    change.event_type = EventType::Change;
    change.timestamp = 1100;

    session.ingest(&raw(click), Instant::now());
    session.ingest(&raw(change), Instant::now());
    assert_eq!(session.events().len(), 1);
    assert_eq!(session.events()[0].event_type, EventType::Click);
}

#[test]
fn test_idle_session_discards_events() {
    let mut session = session();
    let before = session.regenerations();

    let outcome = session.ingest(&raw(login_click(1000)), Instant::now());

    assert_eq!(outcome, IngestOutcome::Discarded);
    assert!(session.tabs().active().is_empty());
    assert!(session.events().is_empty());
    assert_eq!(session.regenerations(), before);
}

#[test]
fn test_malformed_messages_are_ignored() {
    let mut session = recording();
    let now = Instant::now();
    assert_eq!(session.ingest("hello from the page", now), IngestOutcome::Ignored);
    assert_eq!(session.ingest("{\"type\":\"RECORDED_EVENT\"", now), IngestOutcome::Ignored);
    assert_eq!(
        session.ingest("{\"type\":\"OTHER\",\"event\":{}}", now),
        IngestOutcome::Ignored
    );
    assert!(session.events().is_empty());
}

#[test]
fn test_keystroke_burst_yields_one_event() {
    let mut session = recording();
    let start = Instant::now();

    let outcome = session.ingest(&raw(keystroke("b", 1000)), start);
    assert!(matches!(outcome, IngestOutcome::Processed { buffered: true, accepted: 0, .. }));
    session.ingest(&raw(keystroke("bo", 1400)), start + Duration::from_millis(400));

    assert!(!session.flush_due(start + Duration::from_millis(1000)));
    assert!(session.flush_due(start + Duration::from_millis(1400)));

    assert_eq!(session.events().len(), 1);
    assert_eq!(session.events()[0].value.as_deref(), Some("bo"));
    assert!(session.debounce_deadline().is_none());
}

#[test]
fn test_non_input_flushes_pending_keystroke_first() {
    let mut session = recording();
    let now = Instant::now();
    session.ingest(&raw(keystroke("bob", 1000)), now);

    let submit = RecordedEvent::new(EventType::Submit, "form", 1200).with_selector("form");
    let outcome = session.ingest(&raw(submit), now);

    assert_eq!(
        outcome,
        IngestOutcome::Processed {
            accepted: 2,
            suppressed: 0,
            buffered: false
        }
    );
    let types: Vec<EventType> = session.events().iter().map(|e| e.event_type).collect();
    assert_eq!(types, vec![EventType::Input, EventType::Submit]);
}

#[test]
fn test_stop_drops_pending_keystroke() {
    let mut session = recording();
    let now = Instant::now();
    session.ingest(&raw(keystroke("bob", 1000)), now);
    session.stop();

    assert!(!session.flush_due(now + Duration::from_secs(5)));
    assert!(session.events().is_empty());
    assert_eq!(session.ingest(&raw(login_click(9000)), now), IngestOutcome::Discarded);
}

#[test]
fn test_display_order_is_descending_and_steps_ascending() {
    let mut session = recording();
    let now = Instant::now();
    for (selector, ts) in [("#a", 1000), ("#b", 2000), ("#c", 3000)] {
        session.ingest(&raw(click_on(selector, ts)), now);
    }

    let displayed: Vec<&str> = session
        .tabs()
        .active()
        .events()
        .iter()
        .filter_map(|e| e.recorded_event())
        .map(|e| e.selector.as_str())
        .collect();
    assert_eq!(displayed, vec!["#c", "#b", "#a"]);

    let steps: Vec<&str> = session.steps().iter().map(|s| s.code.as_str()).collect();
    assert!(steps[0].contains("\"#a\""));
    assert!(steps[2].contains("\"#c\""));
}

#[test]
fn test_late_event_is_placed_by_timestamp() {
    let mut session = recording();
    let now = Instant::now();
    session.ingest(&raw(click_on("#a", 1000)), now);
    session.ingest(&raw(click_on("#c", 3000)), now);
    session.ingest(&raw(click_on("#b", 2000)), now);

    let stamps: Vec<u64> = session.events().iter().map(|e| e.timestamp).collect();
    assert_eq!(stamps, vec![1000, 2000, 3000]);
}

#[test]
fn test_navigation_is_never_suppressed() {
    let mut session = recording();
    assert!(session.record_navigation("https://app.test/a", 5000).is_some());
    assert!(session.record_navigation("https://app.test/a", 5000).is_some());
    assert_eq!(session.tabs().active().len(), 2);
    assert!(session.events().is_empty());
}

#[test]
fn test_navigation_is_ignored_while_idle() {
    let mut session = session();
    assert!(session.record_navigation("https://app.test/", 1).is_none());
    assert!(session.tabs().active().is_empty());
}

#[test]
fn test_clear_keeps_state() {
    let mut session = recording();
    session.ingest(&raw(login_click(1000)), Instant::now());
    session.clear();

    assert!(session.is_recording());
    assert!(session.events().is_empty());
    assert!(session.steps().is_empty());
    assert!(session.tabs().active().is_empty());

    // The fingerprint went with it.
    session.ingest(&raw(login_click(1001)), Instant::now());
    assert_eq!(session.events().len(), 1);
}

#[test]
fn test_new_tab_receives_new_events() {
    let mut session = recording();
    let now = Instant::now();
    let first = session.tabs().active().id.clone();
    session.ingest(&raw(click_on("#a", 1000)), now);

    let second = session.add_tab(Some("Checkout"));
    session.ingest(&raw(click_on("#b", 2000)), now);

    assert_eq!(session.tabs().get(&first).map(|t| t.len()), Some(1));
    assert_eq!(session.tabs().get(&second).map(|t| t.len()), Some(1));
    assert_eq!(session.events().len(), 2);

    session.switch_tab(&first).unwrap();
    session.rename_tab(&first, "Login").unwrap();
    assert_eq!(session.tabs().active().name, "Login");
    session.delete_tab(&second).unwrap();
    assert_eq!(session.delete_tab(&first), Err(RecordingError::LastTab));
}

#[test]
fn test_delete_event_removes_raw_event_and_step() {
    let mut session = recording();
    let now = Instant::now();
    session.ingest(&raw(click_on("#a", 1000)), now);
    session.ingest(&raw(click_on("#b", 2000)), now);

    let id = session.tabs().active().events()[0].id.clone();
    session.delete_event(&id).unwrap();

    assert_eq!(session.events().len(), 1);
    assert_eq!(session.events()[0].selector, "#a");
    assert_eq!(session.steps().len(), 1);
    assert_eq!(
        session.delete_event(&id),
        Err(RecordingError::EventNotFound(id.clone()))
    );
}

#[test]
fn test_framed_events_flow_through() {
    let mut session = recording();
    let event = click_on("#pay button", 1000).with_context(FrameContext::iframe("https://pay.test/", "#pay"));
    session.ingest(&raw(event), Instant::now());
    assert!(session.steps()[0].code.starts_with("driver.switch_to.frame"));
}

#[test]
fn test_snapshot_and_save() {
    let mut session = recording();
    session.ingest(&raw(login_click(1000)), Instant::now());
    session.stop();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, SessionState::Idle);
    assert_eq!(snapshot.url, "https://app.test/login");
    assert_eq!(snapshot.tabs.len(), 1);
    assert_eq!(snapshot.events.len(), 1);

    let now = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let payload = session.save(&SaveOptions::for_project("p-1"), now).unwrap();
    assert_eq!(payload.url, "https://app.test/login");
    assert_eq!(payload.steps.len(), 1);
    assert_eq!(payload.description, "Recorded test from https://app.test/login");
}

#[test]
fn test_save_without_events() {
    let session = recording();
    let err = session
        .save(&SaveOptions::for_project("p-1"), Local::now())
        .unwrap_err();
    assert_eq!(err, RecordingError::NoEvents);
}
