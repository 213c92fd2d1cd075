//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::protocol::{BrowserVersion, CdpRequest, CdpResponse, PageInfo, TargetInfo};
use super::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;
type HandlerMap = Arc<RwLock<HashMap<String, mpsc::UnboundedSender<CdpResponse>>>>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request side of the socket, shared by the client and every page session.
pub(crate) struct Transport {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: PendingMap,
}

impl Transport {
    /// Send a command (optionally scoped to a flattened session) and wait
    /// for its response.
    pub(crate) async fn send(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(|s| s.to_string()),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        {
            let mut ws = self.ws_tx.lock().await;
            if let Err(e) = ws.send(Message::Text(json.into())).await {
                self.pending.lock().remove(&id);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }
}

/// CDP client connected to the browser endpoint.
///
/// Responses are matched to requests by id. Events are routed to the
/// subscriber registered for their session id; browser-level events (no
/// session id) go to the subscriber registered under `""`.
pub struct CdpClient {
    http_endpoint: String,
    browser_ws_url: String,
    transport: Arc<Transport>,
    event_handlers: HandlerMap,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at the given endpoint (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        debug!("Connected to browser: {}", version.browser);

        let browser_ws_url = version.web_socket_debugger_url;

        let (ws_stream, _) = tokio_tungstenite::connect_async(&browser_ws_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let event_handlers: HandlerMap = Arc::new(RwLock::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            let event_handlers = event_handlers.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending, event_handlers).await;
            })
        };

        debug!("CDP client connected to {}", browser_ws_url);

        Ok(Self {
            http_endpoint,
            browser_ws_url,
            transport: Arc::new(Transport {
                ws_tx: tokio::sync::Mutex::new(ws_sink),
                request_id: AtomicU64::new(1),
                pending,
            }),
            event_handlers,
            recv_task,
        })
    }

    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap, event_handlers: HandlerMap) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) => dispatch(resp, &pending, &event_handlers).await,
                        Err(e) => warn!("Failed to parse CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        // Dropping the senders fails every in-flight request and ends every
        // event stream.
        pending.lock().clear();
        event_handlers.write().await.clear();
    }

    /// Send a browser-level command.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport.send(method, params, None).await
    }

    pub fn browser_ws_url(&self) -> &str {
        &self.browser_ws_url
    }

    /// Register a receiver for events of `session_id` (`""` for
    /// browser-level events). Replaces any earlier subscriber.
    pub async fn subscribe(&self, session_id: &str) -> mpsc::UnboundedReceiver<CdpResponse> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.event_handlers.write().await.insert(session_id.to_string(), tx);
        rx
    }

    // ========================================================================
    // Target Management
    // ========================================================================

    /// List all pages.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, CdpError> {
        let url = format!("{}/json/list", self.http_endpoint);
        let pages: Vec<PageInfo> = reqwest::get(&url).await?.json().await?;
        Ok(pages)
    }

    /// Get all targets.
    pub async fn get_targets(&self) -> Result<Vec<TargetInfo>, CdpError> {
        let result = self.call("Target.getTargets", None).await?;
        let targets: Vec<TargetInfo> = serde_json::from_value(result["targetInfos"].clone())?;
        Ok(targets)
    }

    /// Ask the browser to report target creation (popups) as events.
    pub async fn discover_targets(&self) -> Result<(), CdpError> {
        self.call("Target.setDiscoverTargets", Some(json!({"discover": true})))
            .await?;
        Ok(())
    }

    /// Open a new page and attach to it.
    pub async fn new_page(
        &self,
        url: Option<&str>,
    ) -> Result<(PageSession, mpsc::UnboundedReceiver<CdpResponse>), CdpError> {
        let result = self
            .call(
                "Target.createTarget",
                Some(json!({"url": url.unwrap_or("about:blank")})),
            )
            .await?;

        let target_id = result["targetId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing targetId".to_string()))?;
        debug!("Created new page: {}", target_id);

        self.attach_page(target_id).await
    }

    /// Attach to an existing page target and enable the domains the
    /// recorder relies on. Returns the session with its event stream.
    pub async fn attach_page(
        &self,
        target_id: &str,
    ) -> Result<(PageSession, mpsc::UnboundedReceiver<CdpResponse>), CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
            )
            .await
            .map_err(|e| match e {
                CdpError::Protocol { .. } => CdpError::TargetNotFound(target_id.to_string()),
                other => other,
            })?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let events = self.subscribe(&session_id).await;
        let session = PageSession::new(target_id.to_string(), session_id, self.transport.clone());
        session.enable_domains().await?;

        Ok((session, events))
    }

    /// Close a page/target.
    pub async fn close_page(&self, target_id: &str) -> Result<(), CdpError> {
        self.call("Target.closeTarget", Some(json!({"targetId": target_id})))
            .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

/// Route one decoded message: complete the pending request it answers, or
/// forward it to the subscriber of its session.
async fn dispatch(resp: CdpResponse, pending: &PendingMap, event_handlers: &HandlerMap) {
    if let Some(id) = resp.id {
        let waiter = pending.lock().remove(&id);
        if let Some(tx) = waiter {
            let _ = tx.send(response_result(resp));
        }
    } else if resp.method.is_some() {
        let session_id = resp.session_id.clone().unwrap_or_default();
        let handlers = event_handlers.read().await;
        if let Some(tx) = handlers.get(&session_id) {
            let _ = tx.send(resp);
        }
    }
}

fn response_result(resp: CdpResponse) -> Result<Value, CdpError> {
    match resp.error {
        Some(error) => Err(CdpError::Protocol {
            code: error.code,
            message: error.message,
        }),
        None => Ok(resp.result.unwrap_or(Value::Null)),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
