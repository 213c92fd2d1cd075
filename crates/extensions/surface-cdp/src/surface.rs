//! [`BrowsingSurface`] backed by a Chrome page over CDP.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use nova_config::SurfaceConfig;
use nova_protocols::{BrowsingSurface, SurfaceError, SurfaceEvent};
use serde_json::Value;
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cdp::{CdpClient, CdpError, CdpResponse, PageSession, TargetInfo};
use crate::events::{map_target_event, SurfaceEventMapper};
use crate::launcher;

/// One Chrome page driven as the recording surface.
///
/// Lifecycle signals of the page, recorder messages posted through the
/// binding (from the page and from instrumented popups) and popup creation
/// all arrive on the receiver returned by [`CdpSurface::connect`].
pub struct CdpSurface {
    client: Arc<CdpClient>,
    page: PageSession,
    popups: tokio::sync::Mutex<HashMap<String, Arc<PageSession>>>,
    binding: String,
    events: mpsc::UnboundedSender<SurfaceEvent>,
    pumps: parking_lot::Mutex<Vec<JoinHandle<()>>>,
    /// Browser process, when this surface launched it.
    _chrome: parking_lot::Mutex<Option<Child>>,
}

impl CdpSurface {
    /// Connect to (or launch) Chrome, attach to its first page and expose
    /// the recorder binding on it.
    pub async fn connect(
        config: &SurfaceConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SurfaceEvent>), CdpError> {
        let chrome = launcher::ensure_running(config).await?;
        let client = Arc::new(CdpClient::connect(&config.endpoint()).await?);
        info!("Connected to Chrome at {}", config.endpoint());

        let browser_events = client.subscribe("").await;
        client.discover_targets().await?;

        let targets = client.get_targets().await?;
        let (page, page_events) = match pick_page(&targets) {
            Some(target) => client.attach_page(&target.target_id).await?,
            None => client.new_page(Some(&config.blank_url)).await?,
        };
        page.add_binding(&config.binding_name).await?;

        let frame_id = page.main_frame_id().await?;
        let url = page.current_url().await?;
        debug!("Attached to page {} at {}", page.target_id(), url);

        let (tx, rx) = mpsc::unbounded_channel();
        let mapper = SurfaceEventMapper::new(&config.binding_name).with_main_frame(frame_id, url);
        let pumps = vec![
            tokio::spawn(pump_page(page_events, mapper, tx.clone())),
            tokio::spawn(pump_targets(browser_events, tx.clone())),
        ];

        let surface = Self {
            client,
            page,
            popups: tokio::sync::Mutex::new(HashMap::new()),
            binding: config.binding_name.clone(),
            events: tx,
            pumps: parking_lot::Mutex::new(pumps),
            _chrome: parking_lot::Mutex::new(chrome),
        };
        Ok((surface, rx))
    }

    pub fn target_id(&self) -> &str {
        self.page.target_id()
    }

    /// Session for a popup window, attaching and exposing the binding on
    /// first use. Only recorder messages are forwarded from popups.
    async fn popup(&self, target_id: &str) -> Result<Arc<PageSession>, CdpError> {
        let mut popups = self.popups.lock().await;
        if let Some(session) = popups.get(target_id) {
            return Ok(session.clone());
        }

        let (session, events) = self.client.attach_page(target_id).await?;
        session.add_binding(&self.binding).await?;

        let mapper = SurfaceEventMapper::new(&self.binding);
        let pump = tokio::spawn(pump_channel(events, mapper, self.events.clone()));
        self.pumps.lock().push(pump);

        let session = Arc::new(session);
        popups.insert(target_id.to_string(), session.clone());
        debug!("Attached to popup {}", target_id);
        Ok(session)
    }
}

impl Drop for CdpSurface {
    fn drop(&mut self) {
        for pump in self.pumps.lock().drain(..) {
            pump.abort();
        }
    }
}

#[async_trait]
impl BrowsingSurface for CdpSurface {
    async fn execute_script(&self, script: &str) -> Result<Value, SurfaceError> {
        Ok(self.page.evaluate(script).await?)
    }

    async fn execute_in_window(&self, target_id: &str, script: &str) -> Result<Value, SurfaceError> {
        let session = self.popup(target_id).await?;
        let value = session.evaluate(script).await?;
        // Popups usually open on about:blank and navigate right after.
        session.add_script_on_new_document(script).await?;
        Ok(value)
    }

    async fn navigate(&self, url: &str) -> Result<(), SurfaceError> {
        let parsed = url::Url::parse(url).map_err(CdpError::from)?;
        self.page.navigate(parsed.as_str()).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, SurfaceError> {
        Ok(self.page.current_url().await?)
    }
}

/// First ordinary page target: not a popup, not a devtools window.
fn pick_page(targets: &[TargetInfo]) -> Option<&TargetInfo> {
    targets.iter().find(|t| {
        t.target_type == "page" && t.opener_id.is_none() && !t.url.starts_with("devtools://")
    })
}

async fn pump_page(
    mut events: mpsc::UnboundedReceiver<CdpResponse>,
    mut mapper: SurfaceEventMapper,
    tx: mpsc::UnboundedSender<SurfaceEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(method) = event.method else { continue };
        let params = event.params.unwrap_or(Value::Null);
        if let Some(mapped) = mapper.map(&method, &params) {
            if tx.send(mapped).is_err() {
                break;
            }
        }
    }
    debug!("Page event stream ended");
}

async fn pump_channel(
    mut events: mpsc::UnboundedReceiver<CdpResponse>,
    mut mapper: SurfaceEventMapper,
    tx: mpsc::UnboundedSender<SurfaceEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(method) = event.method else { continue };
        let params = event.params.unwrap_or(Value::Null);
        if let Some(message @ SurfaceEvent::ChannelMessage(_)) = mapper.map(&method, &params) {
            if tx.send(message).is_err() {
                break;
            }
        }
    }
}

async fn pump_targets(
    mut events: mpsc::UnboundedReceiver<CdpResponse>,
    tx: mpsc::UnboundedSender<SurfaceEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(method) = event.method else { continue };
        let params = event.params.unwrap_or(Value::Null);
        if let Some(opened) = map_target_event(&method, &params) {
            if tx.send(opened).is_err() {
                break;
            }
        }
    }
}
