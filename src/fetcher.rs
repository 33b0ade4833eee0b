//! HTTP retrieval for article pages and media files.
//!
//! [`Fetch`] is the seam the rest of the pipeline depends on. The production
//! implementation, [`HttpFetcher`], wraps one shared `reqwest::Client` that
//! carries the configured timeout and User-Agent. There is no retry: a
//! failure is returned to the caller, which either skips the resource or
//! aborts the session.

use crate::config::ScrapeConfig;
use crate::error::FetchError;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

/// Something that can download the bytes behind an absolute URL.
// Futures are polled on the session task by `run_batch` and are never spawned,
// so they need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;

    /// Download a page and decode it as text, replacing invalid UTF-8.
    async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        let bytes = self.fetch(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// [`Fetch`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;
        debug!(bytes = body.len(), "Fetched");
        Ok(body.to_vec())
    }
}
