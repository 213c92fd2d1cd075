use serde_json::json;

use super::*;

const BINDING: &str = "__novaRecorderEmit";

fn mapper() -> SurfaceEventMapper {
    SurfaceEventMapper::new(BINDING).with_main_frame("F1", "https://app.test/")
}

fn navigated(id: &str, parent: Option<&str>, url: &str) -> Value {
    let mut frame = json!({"id": id, "url": url, "loaderId": "L1"});
    if let Some(parent) = parent {
        frame["parentId"] = json!(parent);
    }
    json!({"frame": frame, "type": "Navigation"})
}

#[test]
fn test_main_frame_navigation() {
    let mut m = mapper();
    let event = m.map("Page.frameNavigated", &navigated("F1", None, "https://app.test/next"));
    assert_eq!(
        event,
        Some(SurfaceEvent::NavigationStart {
            url: "https://app.test/next".to_string()
        })
    );
    assert_eq!(m.current_url(), "https://app.test/next");

    assert_eq!(
        m.map("Page.loadEventFired", &json!({"timestamp": 1.0})),
        Some(SurfaceEvent::LoadStop {
            url: "https://app.test/next".to_string()
        })
    );
    assert_eq!(
        m.map("Page.domContentEventFired", &json!({"timestamp": 1.0})),
        Some(SurfaceEvent::DomReady {
            url: "https://app.test/next".to_string()
        })
    );
}

#[test]
fn test_subframe_navigation_is_ignored() {
    let mut m = mapper();
    let event = m.map("Page.frameNavigated", &navigated("F2", Some("F1"), "https://ads.test/"));
    assert_eq!(event, None);
    assert_eq!(m.current_url(), "https://app.test/");
}

#[test]
fn test_main_frame_learned_from_first_navigation() {
    let mut m = SurfaceEventMapper::new(BINDING);
    m.map("Page.frameNavigated", &navigated("F7", None, "https://app.test/"));
    assert_eq!(
        m.map("Page.frameStartedLoading", &json!({"frameId": "F7"})),
        Some(SurfaceEvent::LoadStart)
    );
    assert_eq!(m.map("Page.frameStartedLoading", &json!({"frameId": "F8"})), None);
}

#[test]
fn test_binding_calls() {
    let mut m = mapper();
    let ours = json!({"name": BINDING, "payload": "{\"type\":\"recorded-event\"}", "executionContextId": 2});
    assert_eq!(
        m.map("Runtime.bindingCalled", &ours),
        Some(SurfaceEvent::ChannelMessage("{\"type\":\"recorded-event\"}".to_string()))
    );

    let other = json!({"name": "somethingElse", "payload": "x", "executionContextId": 2});
    assert_eq!(m.map("Runtime.bindingCalled", &other), None);
}

#[test]
fn test_document_load_failure() {
    let mut m = mapper();
    m.map(
        "Network.requestWillBeSent",
        &json!({
            "requestId": "R1", "frameId": "F1", "type": "Document",
            "request": {"url": "https://down.test/", "method": "GET"}
        }),
    );

    let event = m.map(
        "Network.loadingFailed",
        &json!({
            "requestId": "R1", "type": "Document",
            "errorText": "net::ERR_NAME_NOT_RESOLVED", "canceled": false
        }),
    );
    assert_eq!(
        event,
        Some(SurfaceEvent::LoadFailed(LoadFailure {
            code: 0,
            description: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            url: "https://down.test/".to_string(),
        }))
    );
}

#[test]
fn test_cancelled_document_load_maps_to_aborted() {
    let mut m = mapper();
    m.map(
        "Network.requestWillBeSent",
        &json!({"requestId": "R2", "frameId": "F1", "type": "Document", "request": {"url": "https://a.test/"}}),
    );
    let event = m.map(
        "Network.loadingFailed",
        &json!({"requestId": "R2", "type": "Document", "errorText": "net::ERR_ABORTED", "canceled": true}),
    );
    match event {
        Some(SurfaceEvent::LoadFailed(failure)) => assert_eq!(failure.code, -3),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_subresource_failures_are_ignored() {
    let mut m = mapper();
    m.map(
        "Network.requestWillBeSent",
        &json!({"requestId": "R3", "frameId": "F1", "type": "Image", "request": {"url": "https://a.test/x.png"}}),
    );
    let event = m.map(
        "Network.loadingFailed",
        &json!({"requestId": "R3", "type": "Image", "errorText": "net::ERR_FAILED"}),
    );
    assert_eq!(event, None);

    // Subframe documents are not the page's load.
    m.map(
        "Network.requestWillBeSent",
        &json!({"requestId": "R4", "frameId": "F2", "type": "Document", "request": {"url": "https://ads.test/"}}),
    );
    let event = m.map(
        "Network.loadingFailed",
        &json!({"requestId": "R4", "type": "Document", "errorText": "net::ERR_FAILED"}),
    );
    assert_eq!(event, None);
}

#[test]
fn test_popup_target_created() {
    let popup = json!({"targetInfo": {
        "targetId": "T2", "type": "page", "title": "", "url": "https://app.test/popup",
        "attached": false, "openerId": "T1"
    }});
    assert_eq!(
        map_target_event("Target.targetCreated", &popup),
        Some(SurfaceEvent::WindowOpened {
            target_id: "T2".to_string(),
            url: "https://app.test/popup".to_string(),
        })
    );

    let worker = json!({"targetInfo": {
        "targetId": "W1", "type": "service_worker", "title": "", "url": "https://app.test/sw.js",
        "attached": false, "openerId": "T1"
    }});
    assert_eq!(map_target_event("Target.targetCreated", &worker), None);

    let fresh_tab = json!({"targetInfo": {
        "targetId": "T3", "type": "page", "title": "", "url": "about:blank", "attached": false
    }});
    assert_eq!(map_target_event("Target.targetCreated", &fresh_tab), None);
}
