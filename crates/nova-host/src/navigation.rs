//! Recorder re-injection gating.

/// Decides whether a settled page needs the recorder injected.
///
/// The recorder is injected at most once per URL, and never into the blank
/// placeholder page. A new navigation start clears the memory so reloading
/// the same URL gets a fresh recorder.
#[derive(Debug, Clone)]
pub struct NavigationTracker {
    blank_url: String,
    last_injected: Option<String>,
}

impl NavigationTracker {
    pub fn new(blank_url: impl Into<String>) -> Self {
        Self {
            blank_url: blank_url.into(),
            last_injected: None,
        }
    }

    pub fn on_navigation_start(&mut self) {
        self.last_injected = None;
    }

    pub fn should_inject(&self, url: &str) -> bool {
        !self.is_blank(url) && self.last_injected.as_deref() != Some(url)
    }

    pub fn mark_injected(&mut self, url: impl Into<String>) {
        self.last_injected = Some(url.into());
    }

    pub fn last_injected(&self) -> Option<&str> {
        self.last_injected.as_deref()
    }

    /// Empty or the placeholder page.
    pub fn is_blank(&self, url: &str) -> bool {
        url.is_empty() || url == self.blank_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_pages_are_never_injected() {
        let tracker = NavigationTracker::new("about:blank");
        assert!(!tracker.should_inject("about:blank"));
        assert!(!tracker.should_inject(""));
        assert!(tracker.should_inject("https://x.test/"));
    }

    #[test]
    fn test_same_url_is_injected_once() {
        let mut tracker = NavigationTracker::new("about:blank");
        tracker.mark_injected("https://x.test/");
        assert!(!tracker.should_inject("https://x.test/"));
        assert!(tracker.should_inject("https://x.test/next"));
        assert_eq!(tracker.last_injected(), Some("https://x.test/"));
    }

    #[test]
    fn test_navigation_start_resets() {
        let mut tracker = NavigationTracker::new("about:blank");
        tracker.mark_injected("https://x.test/");
        tracker.on_navigation_start();
        assert!(tracker.should_inject("https://x.test/"));
    }
}
