//! Browsing surface integration.
//!
//! [`SurfaceDriver`] reacts to a surface's lifecycle signals on behalf of a
//! running [`HostProcessor`](crate::HostProcessor):
//!
//! - channel messages are forwarded to the processor untouched;
//! - a finished load while recording becomes a navigation entry, and once
//!   the page settles the recorder is injected if the gate allows it;
//! - new windows opened by the page get their own recorder, retried on a
//!   fixed schedule while the window is still coming up;
//! - retryable load failures are reloaded with exponential backoff.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use nova_config::Config;
use nova_protocols::{
    BrowsingSurface, ChannelSender, FrameContext, HostChannel, LoadFailure, SurfaceEvent,
};
use nova_recorder::recorder_script;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::HostError;
use crate::load_failure::{LoadFailureKind, RetryPolicy};
use crate::navigation::NavigationTracker;
use crate::processor::HostHandle;

pub struct SurfaceDriver<S: BrowsingSurface> {
    surface: Arc<S>,
    host: HostHandle,
    channel: ChannelSender,
    tracker: NavigationTracker,
    retry: RetryPolicy,
    attempts: HashMap<String, u32>,
    binding: String,
    highlight_class: String,
    settle: Duration,
    attach_delays: Vec<Duration>,
    cancel: CancellationToken,
}

impl<S: BrowsingSurface> SurfaceDriver<S> {
    /// `channel` must feed the processor behind `host`.
    pub fn new(surface: Arc<S>, host: HostHandle, channel: ChannelSender, config: &Config) -> Self {
        Self {
            surface,
            host,
            channel,
            tracker: NavigationTracker::new(config.surface.blank_url.clone()),
            retry: RetryPolicy::from_config(&config.retry),
            attempts: HashMap::new(),
            binding: config.surface.binding_name.clone(),
            highlight_class: config.recorder.highlight_class.clone(),
            settle: config.recorder.navigation_settle(),
            attach_delays: config.recorder.attach_retry_delays(),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop [`run`](Self::run) and abandon any pending settle, backoff or
    /// popup retry once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn host(&self) -> &HostHandle {
        &self.host
    }

    /// Start recording on the page currently shown by the surface.
    pub async fn start_recording(&mut self) -> Result<(), HostError> {
        let url = self.surface.current_url().await?;
        self.host.start(&url).await?;
        self.inject_if_needed(&url).await;
        Ok(())
    }

    pub async fn stop_recording(&mut self) -> Result<(), HostError> {
        self.host.stop().await?;
        Ok(())
    }

    /// Handle surface signals until cancelled or the surface goes away.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<SurfaceEvent>) {
        let cancel = self.cancel.clone();
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => {
                        debug!("Surface event stream closed");
                        break;
                    }
                },
            };
            if let Err(e) = self.handle_event(event).await {
                warn!("Surface event handling failed: {}", e);
            }
        }
    }

    pub async fn handle_event(&mut self, event: SurfaceEvent) -> Result<(), HostError> {
        match event {
            SurfaceEvent::ChannelMessage(raw) => self.channel.post(raw),
            SurfaceEvent::NavigationStart { url } => {
                debug!(url = %url, "Navigation started");
                self.tracker.on_navigation_start();
            }
            SurfaceEvent::LoadStart => debug!("Load started"),
            SurfaceEvent::LoadStop { url } => self.on_load_stop(url).await?,
            SurfaceEvent::DomReady { url } => {
                if self.host.is_recording().await? {
                    self.inject_if_needed(&url).await;
                }
            }
            SurfaceEvent::LoadFailed(failure) => self.on_load_failed(failure).await?,
            SurfaceEvent::WindowOpened { target_id, url } => {
                if self.host.is_recording().await? {
                    self.attach_window(&target_id, &url).await;
                }
            }
        }
        Ok(())
    }

    async fn on_load_stop(&mut self, url: String) -> Result<(), HostError> {
        self.attempts.remove(&url);
        if !self.host.is_recording().await? {
            return Ok(());
        }
        if !self.tracker.is_blank(&url) {
            self.host.navigation(&url, now_millis()).await?;
        }
        if !self.pause(self.settle).await || !self.host.is_recording().await? {
            return Ok(());
        }
        self.inject_if_needed(&url).await;
        Ok(())
    }

    async fn on_load_failed(&mut self, failure: LoadFailure) -> Result<(), HostError> {
        let Some(kind) = LoadFailureKind::classify(&failure) else {
            debug!(url = %failure.url, "Load aborted");
            return Ok(());
        };
        warn!(
            url = %failure.url,
            code = failure.code,
            kind = ?kind,
            "{}",
            kind.user_message()
        );

        let attempt = self.attempts.entry(failure.url.clone()).or_insert(0);
        let Some(delay) = self.retry.delay_for(kind, *attempt) else {
            if kind.is_retryable() {
                warn!(url = %failure.url, attempts = *attempt, "Giving up on page load");
            }
            return Ok(());
        };
        *attempt += 1;
        info!(url = %failure.url, attempt = *attempt, delay_ms = delay.as_millis() as u64, "Retrying page load");

        if !self.pause(delay).await {
            debug!(url = %failure.url, "Page load retry cancelled");
            return Ok(());
        }
        self.surface.navigate(&failure.url).await?;
        Ok(())
    }

    /// Inject the top-level recorder if the gate allows. Returns whether a
    /// script was evaluated successfully.
    async fn inject_if_needed(&mut self, url: &str) -> bool {
        if !self.tracker.should_inject(url) {
            return false;
        }
        let script = recorder_script(&self.binding, &self.highlight_class, None);
        match self.surface.execute_script(&script).await {
            Ok(installed) => {
                debug!(url = %url, installed = %installed, "Recorder injected");
                self.tracker.mark_injected(url);
                true
            }
            Err(e) => {
                warn!(url = %url, "Failed to inject recorder: {}", e);
                false
            }
        }
    }

    /// Instrument a popup, retrying while the window is not ready yet.
    async fn attach_window(&self, target_id: &str, url: &str) -> bool {
        let context = FrameContext::popup(url);
        let script = recorder_script(&self.binding, &self.highlight_class, Some(&context));

        for (attempt, delay) in self.attach_delays.iter().enumerate() {
            if !self.pause(*delay).await {
                return false;
            }
            match self.surface.execute_in_window(target_id, &script).await {
                Ok(_) => {
                    debug!(target_id = %target_id, url = %url, attempt = attempt + 1, "Popup instrumented");
                    return true;
                }
                Err(e) => debug!(target_id = %target_id, attempt = attempt + 1, "Popup not ready: {}", e),
            }
        }
        warn!(
            target_id = %target_id,
            attempts = self.attach_delays.len(),
            "Could not instrument popup window"
        );
        false
    }

    /// Sleep for `delay`. Returns false if cancelled first.
    async fn pause(&self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}

/// Host wall clock in epoch milliseconds. Navigation entries are ordered
/// against recorded events stamped by the page's `Date.now()`, so both sides
/// assume the browser runs on the same machine clock as the host.
fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
