//! Embedded browsing surface abstraction.
//!
//! The host only consumes a surface: it executes scripts in the current
//! document, asks it to navigate, and listens to its lifecycle signals. The
//! signals arrive as [`SurfaceEvent`]s on a queue handed out by the concrete
//! implementation.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SurfaceError;

/// Details of a failed page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// Browser network error code (e.g. -105), 0 when unknown.
    pub code: i64,
    /// Browser error text (e.g. `net::ERR_NAME_NOT_RESOLVED`).
    pub description: String,
    pub url: String,
}

/// Lifecycle and channel signals emitted by a browsing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The main frame started a navigation to `url`.
    NavigationStart { url: String },
    LoadStart,
    /// The main frame finished loading.
    LoadStop { url: String },
    DomReady { url: String },
    LoadFailed(LoadFailure),
    /// A raw string posted on the recorder side channel.
    ChannelMessage(String),
    /// A new window/target was opened by the page.
    WindowOpened { target_id: String, url: String },
}

/// Commands the host issues to the embedded surface.
#[async_trait]
pub trait BrowsingSurface: Send + Sync {
    /// Execute a script in the current top-level document.
    async fn execute_script(&self, script: &str) -> Result<Value, SurfaceError>;

    /// Execute a script in a secondary window opened by the page.
    async fn execute_in_window(&self, target_id: &str, script: &str) -> Result<Value, SurfaceError>;

    async fn navigate(&self, url: &str) -> Result<(), SurfaceError>;

    async fn current_url(&self) -> Result<String, SurfaceError>;
}
