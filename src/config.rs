//! Scrape policy configuration.
//!
//! Everything that tunes the pipeline (concurrency ceiling, request timeout,
//! image floor, keyword deny-list, video provider allow-list) lives in
//! [`ScrapeConfig`]. Defaults reproduce the built-in policy; a YAML file may
//! override any subset of fields:
//!
//! ```yaml
//! concurrency: 4
//! deny_keywords: [logo, icon, ad, banner, sponsor, avatar]
//! video_providers: [youtube, vimeo.com]
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};

/// Concurrent downloads per batch.
pub const DEFAULT_CONCURRENCY: usize = 10;
/// Per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Minimum width and height for a saved image, in pixels.
pub const DEFAULT_MIN_IMAGE_SIDE: u32 = 100;

/// Tunable scrape policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Maximum number of in-flight media downloads per batch.
    pub concurrency: usize,
    /// Timeout applied to every HTTP request, in seconds.
    pub timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    pub min_image_width: u32,
    pub min_image_height: u32,
    /// Case-insensitive substrings that mark an image URL as decorative.
    pub deny_keywords: Vec<String>,
    /// Substrings that mark an `<iframe src>` as an embedded video player.
    pub video_providers: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("news_media_scraper/{}", env!("CARGO_PKG_VERSION")),
            min_image_width: DEFAULT_MIN_IMAGE_SIDE,
            min_image_height: DEFAULT_MIN_IMAGE_SIDE,
            deny_keywords: ["logo", "icon", "ad", "banner", "sponsor"]
                .into_iter()
                .map(String::from)
                .collect(),
            video_providers: vec!["youtube".to_string()],
        }
    }
}

impl ScrapeConfig {
    /// Load a config from a YAML file. Missing fields keep their defaults.
    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let raw = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&raw)?;
        info!(
            concurrency = config.concurrency,
            timeout_secs = config.timeout_secs,
            "Loaded scrape configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Concurrency ceiling, never below one worker.
    pub fn workers(&self) -> usize {
        self.concurrency.max(1)
    }
}
