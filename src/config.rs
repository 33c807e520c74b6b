/// Runtime settings for the content script and popup
use std::time::Duration;

use crate::selectors::SelectorProfile;

pub const SITE_ORIGIN: &str = "https://www.4wdsupacentre.com.au";
const STORAGE_KEY: &str = "trackedProducts";
pub const TRACK_BUTTON_ID: &str = "price-tracker-btn";
pub const PANEL_ID: &str = "price-history-display";
pub const EXPORT_PREFIX: &str = "4wd-price-tracker";

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub site_origin: String,
    pub search_path: String,
    pub storage_key: String,
    /// Time between checks for the add-to-cart button
    pub poll_interval: Duration,
    pub poll_attempts: u32,
    /// Delay after an SPA navigation before re-initializing
    pub navigation_delay: Duration,
    /// How many entries the inline panel lists
    pub recent_entries: usize,
    pub selectors: SelectorProfile,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            site_origin: SITE_ORIGIN.to_string(),
            search_path: "/search.html".to_string(),
            storage_key: STORAGE_KEY.to_string(),
            poll_interval: Duration::from_millis(500),
            poll_attempts: 20,
            navigation_delay: Duration::from_millis(1000),
            recent_entries: 5,
            selectors: SelectorProfile::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();

        assert_eq!(config.storage_key, "trackedProducts");
        assert_eq!(config.poll_attempts, 20);
        // 20 attempts at 500ms gives the page ten seconds
        assert_eq!(config.poll_interval * config.poll_attempts, Duration::from_secs(10));
        assert_eq!(config.recent_entries, 5);
    }
}
