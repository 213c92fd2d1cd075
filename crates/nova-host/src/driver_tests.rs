use std::time::Duration;

use async_trait::async_trait;
use nova_protocols::{ChannelMessage, EventType, RecordedEvent, RecordingError, SurfaceError};
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::*;
use crate::processor::HostProcessor;
use crate::session::RecordingSession;

#[derive(Default)]
struct MockSurface {
    url: Mutex<String>,
    scripts: Mutex<Vec<String>>,
    window_scripts: Mutex<Vec<(String, String)>>,
    navigations: Mutex<Vec<String>>,
    window_failures: Mutex<u32>,
}

impl MockSurface {
    fn at(url: &str) -> Arc<Self> {
        let surface = Self::default();
        *surface.url.lock() = url.to_string();
        Arc::new(surface)
    }

    fn script_count(&self) -> usize {
        self.scripts.lock().len()
    }
}

#[async_trait]
impl BrowsingSurface for MockSurface {
    async fn execute_script(&self, script: &str) -> Result<Value, SurfaceError> {
        self.scripts.lock().push(script.to_string());
        Ok(json!(true))
    }

    async fn execute_in_window(&self, target_id: &str, script: &str) -> Result<Value, SurfaceError> {
        let mut failures = self.window_failures.lock();
        if *failures > 0 {
            *failures -= 1;
            return Err(SurfaceError::TargetNotFound(target_id.to_string()));
        }
        self.window_scripts
            .lock()
            .push((target_id.to_string(), script.to_string()));
        Ok(json!(true))
    }

    async fn navigate(&self, url: &str) -> Result<(), SurfaceError> {
        self.navigations.lock().push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, SurfaceError> {
        Ok(self.url.lock().clone())
    }
}

fn driver(surface: Arc<MockSurface>) -> SurfaceDriver<MockSurface> {
    let config = Config::default();
    let (sender, rx) = ChannelSender::pair();
    let session = RecordingSession::new(&config.recorder, config.surface.blank_url.clone());
    let (host, _task) = HostProcessor::spawn(session, rx, CancellationToken::new());
    SurfaceDriver::new(surface, host, sender, &config)
}

fn load_stop(url: &str) -> SurfaceEvent {
    SurfaceEvent::LoadStop { url: url.to_string() }
}

#[tokio::test]
async fn test_start_requires_loaded_page() {
    let surface = MockSurface::at("about:blank");
    let mut driver = driver(surface.clone());

    let err = driver.start_recording().await.unwrap_err();
    assert!(matches!(err, HostError::Recording(RecordingError::NoPageLoaded)));
    assert_eq!(surface.script_count(), 0);
}

#[tokio::test]
async fn test_start_injects_recorder() {
    let surface = MockSurface::at("https://app.test/");
    let mut driver = driver(surface.clone());

    driver.start_recording().await.unwrap();

    assert!(driver.host().is_recording().await.unwrap());
    let scripts = surface.scripts.lock();
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].contains("const CONTEXT = null;"));
}

#[tokio::test(start_paused = true)]
async fn test_load_stop_records_navigation_and_reinjects() {
    let surface = MockSurface::at("https://app.test/");
    let mut driver = driver(surface.clone());
    driver.start_recording().await.unwrap();

    driver
        .handle_event(SurfaceEvent::NavigationStart { url: "https://app.test/next".to_string() })
        .await
        .unwrap();
    driver.handle_event(load_stop("https://app.test/next")).await.unwrap();
    assert_eq!(surface.script_count(), 2);

    // Same page again without a new navigation start: already instrumented.
    driver
        .handle_event(SurfaceEvent::DomReady { url: "https://app.test/next".to_string() })
        .await
        .unwrap();
    assert_eq!(surface.script_count(), 2);

    let snapshot = driver.host().snapshot().await.unwrap();
    let active = snapshot.active().unwrap();
    assert_eq!(active.len(), 1);
    assert!(active.events()[0].is_navigation());
}

#[tokio::test(start_paused = true)]
async fn test_reload_of_same_url_is_reinjected() {
    let surface = MockSurface::at("https://app.test/");
    let mut driver = driver(surface.clone());
    driver.start_recording().await.unwrap();

    driver
        .handle_event(SurfaceEvent::NavigationStart { url: "https://app.test/".to_string() })
        .await
        .unwrap();
    driver.handle_event(load_stop("https://app.test/")).await.unwrap();
    assert_eq!(surface.script_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_idle_surface_events_are_not_recorded() {
    let surface = MockSurface::at("https://app.test/");
    let mut driver = driver(surface.clone());

    driver.handle_event(load_stop("https://app.test/")).await.unwrap();
    driver
        .handle_event(SurfaceEvent::WindowOpened {
            target_id: "T1".to_string(),
            url: "https://app.test/popup".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(surface.script_count(), 0);
    assert!(surface.window_scripts.lock().is_empty());
    let snapshot = driver.host().snapshot().await.unwrap();
    assert!(snapshot.tabs[0].is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_blank_page_is_neither_recorded_nor_injected() {
    let surface = MockSurface::at("https://app.test/");
    let mut driver = driver(surface.clone());
    driver.start_recording().await.unwrap();

    driver.handle_event(SurfaceEvent::NavigationStart { url: "about:blank".to_string() }).await.unwrap();
    driver.handle_event(load_stop("about:blank")).await.unwrap();

    assert_eq!(surface.script_count(), 1);
    assert!(driver.host().snapshot().await.unwrap().tabs[0].is_empty());
}

#[tokio::test]
async fn test_channel_messages_reach_the_host() {
    let surface = MockSurface::at("https://app.test/");
    let mut driver = driver(surface);
    driver.start_recording().await.unwrap();

    let click = RecordedEvent::new(EventType::Click, "button", 1000).with_selector("#go");
    let raw = ChannelMessage::recorded(click).encode().unwrap();
    driver.handle_event(SurfaceEvent::ChannelMessage(raw)).await.unwrap();
    driver
        .handle_event(SurfaceEvent::ChannelMessage("unrelated console output".to_string()))
        .await
        .unwrap();

    let snapshot = driver.host().snapshot().await.unwrap();
    assert_eq!(snapshot.events.len(), 1);
    assert_eq!(snapshot.steps.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_popup_is_instrumented_after_retries() {
    let surface = MockSurface::at("https://app.test/");
    *surface.window_failures.lock() = 2;
    let mut driver = driver(surface.clone());
    driver.start_recording().await.unwrap();

    driver
        .handle_event(SurfaceEvent::WindowOpened {
            target_id: "T1".to_string(),
            url: "https://app.test/popup".to_string(),
        })
        .await
        .unwrap();

    let window_scripts = surface.window_scripts.lock();
    assert_eq!(window_scripts.len(), 1);
    assert_eq!(window_scripts[0].0, "T1");
    assert!(window_scripts[0].1.contains(r#""type":"popup""#));
}

#[tokio::test(start_paused = true)]
async fn test_popup_gives_up_after_schedule() {
    let surface = MockSurface::at("https://app.test/");
    *surface.window_failures.lock() = 10;
    let mut driver = driver(surface.clone());
    driver.start_recording().await.unwrap();

    driver
        .handle_event(SurfaceEvent::WindowOpened {
            target_id: "T1".to_string(),
            url: "https://app.test/popup".to_string(),
        })
        .await
        .unwrap();

    assert!(surface.window_scripts.lock().is_empty());
    assert_eq!(*surface.window_failures.lock(), 7);
}

fn failed(code: i64, description: &str) -> SurfaceEvent {
    SurfaceEvent::LoadFailed(LoadFailure {
        code,
        description: description.to_string(),
        url: "https://down.test/".to_string(),
    })
}

#[tokio::test(start_paused = true)]
async fn test_retryable_failure_is_reloaded_until_exhausted() {
    let surface = MockSurface::at("https://app.test/");
    let mut driver = driver(surface.clone());

    let started = tokio::time::Instant::now();
    for _ in 0..4 {
        driver
            .handle_event(failed(-106, "net::ERR_INTERNET_DISCONNECTED"))
            .await
            .unwrap();
    }

    assert_eq!(surface.navigations.lock().len(), 3);
    assert!(started.elapsed() >= Duration::from_secs(1 + 2 + 4));
}

#[tokio::test(start_paused = true)]
async fn test_successful_load_resets_attempts() {
    let surface = MockSurface::at("https://app.test/");
    let mut driver = driver(surface.clone());

    driver.handle_event(failed(-106, "")).await.unwrap();
    driver.handle_event(load_stop("https://down.test/")).await.unwrap();
    driver.handle_event(failed(-106, "")).await.unwrap();

    assert_eq!(surface.navigations.lock().len(), 2);
}

#[tokio::test]
async fn test_certificate_and_aborted_failures_are_not_retried() {
    let surface = MockSurface::at("https://app.test/");
    let mut driver = driver(surface.clone());

    driver.handle_event(failed(-202, "net::ERR_CERT_AUTHORITY_INVALID")).await.unwrap();
    driver.handle_event(failed(-105, "net::ERR_NAME_NOT_RESOLVED")).await.unwrap();
    driver.handle_event(failed(-3, "net::ERR_ABORTED")).await.unwrap();

    assert!(surface.navigations.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff_stops_reloads() {
    let surface = MockSurface::at("https://app.test/");
    let cancel = CancellationToken::new();
    let mut driver = driver(surface.clone()).with_cancellation(cancel.clone());

    let (tx, rx) = mpsc::unbounded_channel();
    for _ in 0..3 {
        tx.send(failed(-106, "net::ERR_INTERNET_DISCONNECTED")).unwrap();
    }
    let stopper = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        stopper.cancel();
    });

    let started = tokio::time::Instant::now();
    driver.run(rx).await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(surface.navigations.lock().is_empty());
    drop(tx);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_driver_skips_settle_injection() {
    let surface = MockSurface::at("https://app.test/");
    let cancel = CancellationToken::new();
    let mut driver = driver(surface.clone()).with_cancellation(cancel.clone());
    driver.start_recording().await.unwrap();
    assert_eq!(surface.script_count(), 1);

    cancel.cancel();
    driver
        .handle_event(SurfaceEvent::NavigationStart { url: "https://app.test/next".to_string() })
        .await
        .unwrap();
    driver.handle_event(load_stop("https://app.test/next")).await.unwrap();
    assert_eq!(surface.script_count(), 1);

    *surface.window_failures.lock() = 1;
    driver
        .handle_event(SurfaceEvent::WindowOpened {
            target_id: "popup-1".to_string(),
            url: "https://app.test/popup".to_string(),
        })
        .await
        .unwrap();
    assert!(surface.window_scripts.lock().is_empty());
    assert_eq!(*surface.window_failures.lock(), 1);
}
