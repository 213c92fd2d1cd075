//! Translation of raw CDP events into [`SurfaceEvent`]s.

use std::collections::HashMap;

use nova_protocols::{LoadFailure, SurfaceEvent};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::cdp::{
    BindingCalled, FrameNavigated, FrameStartedLoading, LoadingFailed, RequestWillBeSent,
    TargetCreated,
};

/// Chrome's code for a load cancelled by a newer navigation.
const ERR_ABORTED: i64 = -3;

/// Stateful mapper for the events of the main page session.
///
/// Only main-frame lifecycle is reported; subframe navigations are the
/// recorder's business, not the host's.
#[derive(Debug, Default)]
pub struct SurfaceEventMapper {
    main_frame_id: Option<String>,
    binding: String,
    current_url: String,
    /// Document requests in flight, by request id.
    document_requests: HashMap<String, String>,
}

impl SurfaceEventMapper {
    pub fn new(binding: impl Into<String>) -> Self {
        Self {
            binding: binding.into(),
            ..Default::default()
        }
    }

    /// Pin the main frame id (from `Page.getFrameTree`).
    pub fn with_main_frame(mut self, frame_id: impl Into<String>, url: impl Into<String>) -> Self {
        self.main_frame_id = Some(frame_id.into());
        self.current_url = url.into();
        self
    }

    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    pub fn map(&mut self, method: &str, params: &Value) -> Option<SurfaceEvent> {
        trace!("Mapping CDP event {}", method);
        match method {
            "Page.frameNavigated" => {
                let event: FrameNavigated = parse(params)?;
                if event.frame.parent_id.is_some() {
                    return None;
                }
                if self.main_frame_id.is_none() {
                    self.main_frame_id = Some(event.frame.id.clone());
                }
                self.current_url = event.frame.url.clone();
                Some(SurfaceEvent::NavigationStart { url: event.frame.url })
            }
            "Page.frameStartedLoading" => {
                let event: FrameStartedLoading = parse(params)?;
                self.is_main(&event.frame_id).then_some(SurfaceEvent::LoadStart)
            }
            "Page.domContentEventFired" => Some(SurfaceEvent::DomReady {
                url: self.current_url.clone(),
            }),
            "Page.loadEventFired" => Some(SurfaceEvent::LoadStop {
                url: self.current_url.clone(),
            }),
            "Runtime.bindingCalled" => {
                let event: BindingCalled = parse(params)?;
                (event.name == self.binding).then_some(SurfaceEvent::ChannelMessage(event.payload))
            }
            "Network.requestWillBeSent" => {
                let event: RequestWillBeSent = parse(params)?;
                let main = event.frame_id.as_deref().is_none_or(|id| self.is_main(id));
                if is_document(event.resource_type.as_deref()) && main {
                    self.document_requests
                        .insert(event.request_id, event.request.url);
                }
                None
            }
            "Network.loadingFinished" => {
                let request_id = params["requestId"].as_str()?;
                self.document_requests.remove(request_id);
                None
            }
            "Network.loadingFailed" => {
                let event: LoadingFailed = parse(params)?;
                let url = self.document_requests.remove(&event.request_id)?;
                if !is_document(event.resource_type.as_deref()) {
                    return None;
                }
                let code = if event.canceled { ERR_ABORTED } else { 0 };
                Some(SurfaceEvent::LoadFailed(LoadFailure {
                    code,
                    description: event.error_text,
                    url,
                }))
            }
            _ => None,
        }
    }

    fn is_main(&self, frame_id: &str) -> bool {
        self.main_frame_id.as_deref() == Some(frame_id)
    }
}

/// Map a browser-level `Target.targetCreated` event. Only pages opened by
/// another page count as new windows.
pub fn map_target_event(method: &str, params: &Value) -> Option<SurfaceEvent> {
    if method != "Target.targetCreated" {
        return None;
    }
    let event: TargetCreated = parse(params)?;
    let info = event.target_info;
    if info.target_type != "page" || info.opener_id.is_none() {
        return None;
    }
    Some(SurfaceEvent::WindowOpened {
        target_id: info.target_id,
        url: info.url,
    })
}

fn is_document(resource_type: Option<&str>) -> bool {
    resource_type == Some("Document")
}

fn parse<T: DeserializeOwned>(params: &Value) -> Option<T> {
    match serde_json::from_value(params.clone()) {
        Ok(value) => Some(value),
        Err(e) => {
            trace!("Ignoring malformed CDP event params: {}", e);
            None
        }
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
