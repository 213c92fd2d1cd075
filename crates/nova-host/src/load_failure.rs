//! Page load failure classification and retry policy.

use std::time::Duration;

use nova_config::RetryConfig;
use nova_protocols::LoadFailure;

/// User-visible category of a failed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailureKind {
    Generic,
    NameResolution,
    Connectivity,
    Timeout,
    Certificate,
}

impl LoadFailureKind {
    /// Classify a failure. Aborted loads (the user navigated away, a
    /// download started) are not failures and yield `None`.
    pub fn classify(failure: &LoadFailure) -> Option<Self> {
        let text = failure.description.to_ascii_uppercase();
        if failure.code == -3 || text.contains("ERR_ABORTED") {
            return None;
        }

        let kind = match failure.code {
            -105 | -137 => Self::NameResolution,
            -7 | -118 => Self::Timeout,
            -21 | -104..=-100 | -106 | -109 => Self::Connectivity,
            -299..=-200 => Self::Certificate,
            _ => Self::from_description(&text),
        };
        Some(kind)
    }

    fn from_description(text: &str) -> Self {
        if text.contains("ERR_NAME_NOT_RESOLVED") || text.contains("ERR_NAME_RESOLUTION") {
            Self::NameResolution
        } else if text.contains("ERR_CERT_") || text.contains("SSL") {
            Self::Certificate
        } else if text.contains("TIMED_OUT") || text.contains("TIMEOUT") {
            Self::Timeout
        } else if text.contains("ERR_INTERNET_DISCONNECTED")
            || text.contains("ERR_CONNECTION_")
            || text.contains("ERR_NETWORK_CHANGED")
            || text.contains("ERR_ADDRESS_UNREACHABLE")
        {
            Self::Connectivity
        } else {
            Self::Generic
        }
    }

    /// Certificate and name resolution failures will not fix themselves.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Certificate | Self::NameResolution)
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Generic => "The page failed to load",
            Self::NameResolution => "The site's address could not be found",
            Self::Connectivity => "Could not connect to the site. Check your network connection",
            Self::Timeout => "The site took too long to respond",
            Self::Certificate => "The site's security certificate is not trusted",
        }
    }
}

/// Bounded exponential backoff for retryable load failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay())
    }

    /// Delay before retry number `attempt` (0-based), or `None` when the
    /// failure must not be retried.
    pub fn delay_for(&self, kind: LoadFailureKind, attempt: u32) -> Option<Duration> {
        if !kind.is_retryable() || attempt >= self.max_attempts {
            return None;
        }
        let factor = 2u32.saturating_pow(attempt);
        Some(self.base_delay.saturating_mul(factor))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
