//! `nova record`: drive Chrome over CDP and record until interrupted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use nova_config::Config;
use nova_host::{HostProcessor, RecordingSession, SurfaceDriver};
use nova_protocols::{BrowsingSurface, ChannelSender, SurfaceEvent};
use nova_surface_cdp::CdpSurface;

const INITIAL_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) async fn run(
    config: &Config,
    url: &str,
    duration: Option<u64>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(default_output);

    let (surface, mut events) = CdpSurface::connect(&config.surface)
        .await
        .context("Failed to connect to Chrome")?;
    let surface = Arc::new(surface);

    let (sender, messages) = ChannelSender::pair();
    let session = RecordingSession::new(&config.recorder, config.surface.blank_url.clone());
    let processor_cancel = CancellationToken::new();
    let (host, processor) = HostProcessor::spawn(session, messages, processor_cancel.clone());
    let stop = CancellationToken::new();
    let mut driver =
        SurfaceDriver::new(surface.clone(), host.clone(), sender, config).with_cancellation(stop.clone());

    surface
        .navigate(url)
        .await
        .with_context(|| format!("Failed to open {}", url))?;
    wait_for_load(&mut driver, &mut events).await?;

    driver.start_recording().await?;
    info!("Recording {} (Ctrl-C to stop)", url);

    tokio::spawn(stop_on_signal(stop, duration.map(Duration::from_secs)));
    driver.run(events).await;

    driver.stop_recording().await?;
    let snapshot = host.snapshot().await?;
    snapshot
        .write(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    processor_cancel.cancel();
    let _ = processor.await;

    info!(
        events = snapshot.events.len(),
        steps = snapshot.steps.len(),
        "Recording saved to {}",
        output.display()
    );
    println!("{}", output.display());
    Ok(())
}

/// Feed surface events to the (idle) driver until the first page load
/// finishes, so load failures are retried before recording starts.
async fn wait_for_load<S: BrowsingSurface>(
    driver: &mut SurfaceDriver<S>,
    events: &mut mpsc::UnboundedReceiver<SurfaceEvent>,
) -> anyhow::Result<()> {
    let load = async {
        while let Some(event) = events.recv().await {
            let done = matches!(event, SurfaceEvent::LoadStop { .. });
            if let Err(e) = driver.handle_event(event).await {
                warn!("Surface event handling failed: {}", e);
            }
            if done {
                return true;
            }
        }
        false
    };

    match tokio::time::timeout(INITIAL_LOAD_TIMEOUT, load).await {
        Ok(true) => Ok(()),
        Ok(false) => bail!("Browser closed before the page loaded"),
        Err(_) => bail!(
            "Page did not finish loading within {}s",
            INITIAL_LOAD_TIMEOUT.as_secs()
        ),
    }
}

async fn stop_on_signal(stop: CancellationToken, limit: Option<Duration>) {
    let deadline = async {
        match limit {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("Failed to listen for Ctrl-C: {}", e);
            }
            debug!("Interrupted");
        }
        _ = deadline => debug!("Recording duration elapsed"),
    }
    stop.cancel();
}

fn default_output() -> PathBuf {
    PathBuf::from(format!(
        "recording-{}.json",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ))
}
