use std::time::Duration;

use nova_config::RecorderConfig;
use nova_protocols::{
    ChannelMessage, ChannelSender, EventType, HostChannel, RecordedEvent, RecordingError,
};

use super::*;
use crate::session::SessionState;

fn spawn() -> (ChannelSender, HostHandle, CancellationToken, JoinHandle<RecordingSession>) {
    let (sender, rx) = ChannelSender::pair();
    let cancel = CancellationToken::new();
    let session = RecordingSession::new(&RecorderConfig::default(), "about:blank");
    let (handle, task) = HostProcessor::spawn(session, rx, cancel.clone());
    (sender, handle, cancel, task)
}

fn raw(event: RecordedEvent) -> String {
    ChannelMessage::recorded(event).encode().unwrap()
}

fn keystroke(value: &str, ts: u64) -> RecordedEvent {
    RecordedEvent::new(EventType::Input, "input", ts)
        .with_selector("#search")
        .with_value(value)
}

#[tokio::test(start_paused = true)]
async fn test_keystrokes_flush_after_pause() {
    let (sender, handle, _cancel, _task) = spawn();
    handle.start("https://app.test/").await.unwrap();

    sender.post(raw(keystroke("r", 1000)));
    tokio::time::sleep(Duration::from_millis(400)).await;
    sender.post(raw(keystroke("ru", 1400)));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(handle.snapshot().await.unwrap().events.is_empty());

    tokio::time::sleep(Duration::from_millis(600)).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.events.len(), 1);
    assert_eq!(snapshot.events[0].value.as_deref(), Some("ru"));
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_pending_flush() {
    let (sender, handle, _cancel, _task) = spawn();
    handle.start("https://app.test/").await.unwrap();

    sender.post(raw(keystroke("rust", 1000)));
    handle.stop().await.unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, SessionState::Idle);
    assert!(snapshot.events.is_empty());
}

#[tokio::test]
async fn test_messages_before_start_are_discarded() {
    let (sender, handle, _cancel, _task) = spawn();
    sender.post(raw(RecordedEvent::new(EventType::Click, "a", 10).with_selector("#a")));
    assert!(!handle.is_recording().await.unwrap());

    handle.start("https://app.test/").await.unwrap();
    assert!(handle.is_recording().await.unwrap());
    assert!(handle.snapshot().await.unwrap().events.is_empty());
}

#[tokio::test]
async fn test_start_on_blank_page_is_rejected() {
    let (_sender, handle, _cancel, _task) = spawn();
    assert_eq!(
        handle.start("about:blank").await,
        Err(RecordingError::NoPageLoaded)
    );
}

#[tokio::test]
async fn test_commands_round_trip() {
    let (sender, handle, _cancel, _task) = spawn();
    handle.start("https://app.test/").await.unwrap();

    sender.post(raw(RecordedEvent::new(EventType::Click, "a", 1000).with_selector("#a")));
    assert!(handle.navigation("https://app.test/next", 2000).await.unwrap().is_some());

    let tab = handle.add_tab(Some("Second")).await.unwrap();
    handle.rename_tab(&tab, "Checkout").await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.tabs.len(), 2);
    assert_eq!(snapshot.active_tab, tab);
    assert_eq!(snapshot.tabs[0].len(), 2);

    let first = snapshot.tabs[0].id.clone();
    handle.switch_tab(&first).await.unwrap();
    handle.delete_tab(&tab).await.unwrap();
    assert_eq!(handle.delete_tab(&first).await, Err(RecordingError::LastTab));

    let nav_id = handle.snapshot().await.unwrap().tabs[0].events()[0].id.clone();
    handle.delete_event(&nav_id).await.unwrap();

    let payload = handle
        .save(SaveOptions::for_project("p-1"))
        .await
        .unwrap();
    assert_eq!(payload.events.len(), 1);

    handle.clear().await.unwrap();
    assert!(handle.snapshot().await.unwrap().events.is_empty());
}

#[tokio::test]
async fn test_cancel_stops_processor() {
    let (_sender, handle, cancel, task) = spawn();
    handle.start("https://app.test/").await.unwrap();
    cancel.cancel();

    let session = task.await.unwrap();
    assert!(session.is_recording());
    assert_eq!(handle.is_recording().await, Err(RecordingError::HostStopped));
}

#[tokio::test]
async fn test_processor_exits_when_everything_closes() {
    let (sender, handle, _cancel, task) = spawn();
    drop(sender);
    drop(handle);
    let session = task.await.unwrap();
    assert!(!session.is_recording());
}
