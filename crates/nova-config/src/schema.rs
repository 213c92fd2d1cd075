//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub recorder: RecorderConfig,

    #[serde(default)]
    pub surface: SurfaceConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Timing windows and cosmetics for the recorder and host pipeline.
///
/// The windows encode empirical tuning, so every one of them is configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// An `input` event closer than this to the previous accepted event is dropped.
    #[serde(default = "default_input_dedup_ms")]
    pub input_dedup_ms: u64,

    /// Identical non-input events closer than this are treated as one cascade.
    #[serde(default = "default_cascade_dedup_ms")]
    pub cascade_dedup_ms: u64,

    /// Typing pause after which the buffered `input` event is flushed.
    #[serde(default = "default_input_debounce_ms")]
    pub input_debounce_ms: u64,

    /// Delays between attempts to instrument a popup or late iframe.
    #[serde(default = "default_attach_retry_delays_ms")]
    pub attach_retry_delays_ms: Vec<u64>,

    /// Settle delay after a page load before the recorder is re-injected.
    #[serde(default = "default_navigation_settle_ms")]
    pub navigation_settle_ms: u64,

    /// Class toggled on hovered elements while recording.
    #[serde(default = "default_highlight_class")]
    pub highlight_class: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            input_dedup_ms: default_input_dedup_ms(),
            cascade_dedup_ms: default_cascade_dedup_ms(),
            input_debounce_ms: default_input_debounce_ms(),
            attach_retry_delays_ms: default_attach_retry_delays_ms(),
            navigation_settle_ms: default_navigation_settle_ms(),
            highlight_class: default_highlight_class(),
        }
    }
}

impl RecorderConfig {
    pub fn input_dedup_window(&self) -> Duration {
        Duration::from_millis(self.input_dedup_ms)
    }

    pub fn cascade_dedup_window(&self) -> Duration {
        Duration::from_millis(self.cascade_dedup_ms)
    }

    pub fn input_debounce(&self) -> Duration {
        Duration::from_millis(self.input_debounce_ms)
    }

    pub fn navigation_settle(&self) -> Duration {
        Duration::from_millis(self.navigation_settle_ms)
    }

    pub fn attach_retry_delays(&self) -> Vec<Duration> {
        self.attach_retry_delays_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }
}

fn default_input_dedup_ms() -> u64 {
    1000
}

fn default_cascade_dedup_ms() -> u64 {
    500
}

fn default_input_debounce_ms() -> u64 {
    1000
}

fn default_attach_retry_delays_ms() -> Vec<u64> {
    vec![100, 250, 500]
}

fn default_navigation_settle_ms() -> u64 {
    300
}

fn default_highlight_class() -> String {
    "recording-highlight".to_string()
}

/// Embedded browsing surface configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Chrome remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default)]
    pub headless: bool,

    /// Placeholder page that never receives the recorder.
    #[serde(default = "default_blank_url")]
    pub blank_url: String,

    /// Profile directory for persistent browser state.
    #[serde(default)]
    pub profile_dir: Option<PathBuf>,

    /// Name of the page-side function the recorder posts messages through.
    #[serde(default = "default_binding_name")]
    pub binding_name: String,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: false,
            blank_url: default_blank_url(),
            profile_dir: None,
            binding_name: default_binding_name(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

impl SurfaceConfig {
    /// Resolve the browser profile directory, defaulting to
    /// `~/.nova/browser-profile`.
    pub fn get_profile_dir(&self) -> PathBuf {
        self.profile_dir
            .clone()
            .unwrap_or_else(|| nova_home().join("browser-profile"))
    }

    /// The CDP HTTP endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_blank_url() -> String {
    "about:blank".to_string()
}

fn default_binding_name() -> String {
    "__novaRecorderEmit".to_string()
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    720
}

/// Automatic retry of failed page loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum automatic retries per navigation.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the first retry; doubles on each further attempt.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rotated log files.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    /// Resolve the log directory, defaulting to `~/.nova/logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| nova_home().join("logs"))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Base directory for nova state (`~/.nova`).
pub fn nova_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".nova")
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
