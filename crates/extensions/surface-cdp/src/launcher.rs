//! Locating, launching and waiting for a Chrome instance with remote
//! debugging enabled.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use nova_config::SurfaceConfig;
use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::cdp::CdpError;

const STARTUP_ATTEMPTS: u32 = 30;
const STARTUP_POLL: Duration = Duration::from_millis(200);

/// Find a Chrome-family executable in the usual install locations.
pub fn find_chrome() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    let paths: &[&str] = &[
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
    ];

    #[cfg(target_os = "linux")]
    let paths: &[&str] = &[
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
    ];

    #[cfg(target_os = "windows")]
    let paths: &[&str] = &[
        r"C:\Program Files\Google\Chrome\Application\chrome.exe",
        r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    ];

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    let paths: &[&str] = &[];

    paths.iter().map(PathBuf::from).find(|p| p.exists())
}

/// Command-line flags for a recording browser.
pub fn chrome_args(config: &SurfaceConfig, profile_dir: &Path) -> Vec<String> {
    let mut args = vec![
        format!("--remote-debugging-port={}", config.debug_port),
        format!("--user-data-dir={}", profile_dir.display()),
        format!("--window-size={},{}", config.viewport_width, config.viewport_height),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--disable-background-networking".to_string(),
        "--disable-sync".to_string(),
        "--disable-translate".to_string(),
    ];

    if config.headless {
        args.push("--headless=new".to_string());
    }

    args.push(config.blank_url.clone());
    args
}

/// Whether something answers CDP discovery on the endpoint.
pub async fn is_running(endpoint: &str) -> bool {
    reqwest::get(&format!("{}/json/version", endpoint))
        .await
        .is_ok()
}

/// Launch Chrome with remote debugging enabled.
///
/// The process is killed when the returned handle is dropped.
pub fn launch(config: &SurfaceConfig) -> Result<Child, CdpError> {
    let chrome_path = find_chrome().ok_or(CdpError::ChromeNotFound)?;
    let profile_dir = config.get_profile_dir();

    if let Err(e) = std::fs::create_dir_all(&profile_dir) {
        warn!("Failed to create profile directory: {}", e);
    }

    info!("Launching Chrome with profile at: {}", profile_dir.display());

    let child = Command::new(&chrome_path)
        .args(chrome_args(config, &profile_dir))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| CdpError::LaunchFailed(e.to_string()))?;

    info!("Chrome launched with PID: {:?}", child.id());
    Ok(child)
}

/// Make sure a browser is listening on the configured port, launching one
/// if needed. Returns the child when this call started it.
pub async fn ensure_running(config: &SurfaceConfig) -> Result<Option<Child>, CdpError> {
    let endpoint = config.endpoint();
    if is_running(&endpoint).await {
        info!("Chrome already running on port {}", config.debug_port);
        return Ok(None);
    }

    info!("Chrome not running on port {}, launching...", config.debug_port);
    let child = launch(config)?;

    for _ in 0..STARTUP_ATTEMPTS {
        tokio::time::sleep(STARTUP_POLL).await;
        if is_running(&endpoint).await {
            return Ok(Some(child));
        }
    }

    Err(CdpError::LaunchFailed(
        "Chrome failed to start within timeout".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_args() {
        let config = SurfaceConfig {
            debug_port: 9333,
            viewport_width: 1024,
            viewport_height: 700,
            ..Default::default()
        };
        let args = chrome_args(&config, Path::new("/tmp/profile"));

        assert_eq!(args[0], "--remote-debugging-port=9333");
        assert_eq!(args[1], "--user-data-dir=/tmp/profile");
        assert!(args.contains(&"--window-size=1024,700".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
        assert_eq!(args.last().map(String::as_str), Some("about:blank"));
    }

    #[test]
    fn test_headless_flag() {
        let config = SurfaceConfig {
            headless: true,
            ..Default::default()
        };
        let args = chrome_args(&config, Path::new("/tmp/p"));
        assert!(args.contains(&"--headless=new".to_string()));
    }

    #[tokio::test]
    async fn test_nothing_listening() {
        // Port 9 (discard) is not a CDP endpoint.
        assert!(!is_running("http://127.0.0.1:9").await);
    }
}
