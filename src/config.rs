/// Tunables for the exporter content script

use std::time::Duration;

/// Branding appended to the host page's document title
pub const TITLE_SUFFIX: &str = " - Grok";

#[derive(Debug, Clone, PartialEq)]
pub struct ExporterConfig {
    /// Wait between clicking a copy control and reading the clipboard
    pub settle_delay: Duration,
    /// How often the navigation watcher compares the current URL
    pub poll_interval: Duration,
    pub title_suffix: String,
    pub toast_duration: Duration,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        ExporterConfig {
            settle_delay: Duration::from_millis(500),
            poll_interval: Duration::from_millis(300),
            title_suffix: TITLE_SUFFIX.to_string(),
            toast_duration: Duration::from_millis(3000),
        }
    }
}

/// Convert a duration to the `i32` milliseconds `setTimeout`/`setInterval` expect
pub fn as_timer_millis(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExporterConfig::default();

        assert_eq!(config.settle_delay, Duration::from_millis(500));
        assert_eq!(config.poll_interval, Duration::from_millis(300));
        assert_eq!(config.title_suffix, " - Grok");
    }

    #[test]
    fn test_timer_millis_saturates() {
        assert_eq!(as_timer_millis(Duration::from_millis(500)), 500);
        assert_eq!(as_timer_millis(Duration::from_secs(u64::MAX / 2)), i32::MAX);
    }
}
