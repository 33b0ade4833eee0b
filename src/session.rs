//! Scrape sessions: one article URL (or one raw text) in, one report out.
//!
//! A [`Scraper`] owns the long-lived pieces (fetcher, content store, policy).
//! Each call to [`Scraper::scrape_url`] opens a fresh [`ScrapeSession`] that
//! carries the per-run dedup sets, so no hash ever leaks between runs.
//!
//! # Flow
//!
//! 1. fetch the page; failure ends the session with [`ScrapeError::Fetch`]
//! 2. extract the [`Article`]; failure ends it with [`ScrapeError::Parse`]
//! 3. save the text (a failure here is logged, media still proceed)
//! 4. image batch, then video batch, each through [`run_batch`]

use crate::config::ScrapeConfig;
use crate::coordinator::{BatchSummary, run_batch};
use crate::error::{ParseError, Rejection, ScrapeError};
use crate::fetcher::Fetch;
use crate::filter::{MediaFilter, SeenHashes, content_hash};
use crate::models::{Article, MediaKind, MediaResource, ScrapeReport};
use crate::outputs::store::{ContentStore, VIDEO_EXT};
use crate::scrapers::{article, media};
use crate::utils::{LOG_FIELD_MAX, truncate_for_log};
use tracing::{error, info, instrument, warn};
use url::Url;

/// Mutable state of one scrape run.
#[derive(Debug)]
pub struct ScrapeSession {
    page_url: Url,
    image_hashes: SeenHashes,
    video_hashes: SeenHashes,
}

impl ScrapeSession {
    pub fn new(page_url: Url) -> Self {
        Self {
            page_url,
            image_hashes: SeenHashes::new(),
            video_hashes: SeenHashes::new(),
        }
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    fn hashes(&self, kind: MediaKind) -> &SeenHashes {
        match kind {
            MediaKind::Image => &self.image_hashes,
            MediaKind::Video => &self.video_hashes,
        }
    }
}

/// Entry point for callers: scrape a URL or store raw text.
#[derive(Debug)]
pub struct Scraper<F> {
    fetcher: F,
    store: ContentStore,
    config: ScrapeConfig,
    filter: MediaFilter,
}

impl<F: Fetch> Scraper<F> {
    pub fn new(fetcher: F, store: ContentStore, config: ScrapeConfig) -> Self {
        let filter = MediaFilter::new(&config);
        Self {
            fetcher,
            store,
            config,
            filter,
        }
    }

    /// Scrape the article at `url`, saving its text, images and videos.
    #[instrument(level = "info", skip(self))]
    pub async fn scrape_url(&self, url: &str) -> Result<ScrapeReport, ScrapeError> {
        let page_url = Url::parse(url).map_err(|source| ParseError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        info!(event = "start", "Downloading article");
        let html = self.fetcher.fetch_text(&page_url).await.inspect_err(|e| {
            error!(event = "error", error = %e, "Article download failed");
        })?;
        let article = article::extract(&html, &page_url).inspect_err(|e| {
            error!(event = "error", error = %e, "Article parse failed");
        })?;

        let text_path = match self.store.save_text(&article.title, &article.body_text).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!(event = "error", error = %e, "Failed to save article text");
                None
            }
        };

        let session = ScrapeSession::new(page_url);
        let mut media = self.download_images(&session, &article).await;
        media.extend(self.download_videos(&session, &article).await);

        let report = ScrapeReport::new(&article, Some(session.page_url().as_str()), text_path, media);
        info!(
            event = "complete",
            images = report.n_images_saved,
            videos = report.n_videos_saved,
            "Scrape finished"
        );
        Ok(report)
    }

    /// Store caller-supplied text. No fetch, no extraction, no media.
    #[instrument(level = "info", skip_all)]
    pub async fn scrape_text(
        &self,
        title: Option<&str>,
        text: &str,
    ) -> Result<ScrapeReport, ScrapeError> {
        let article = Article::from_text(title, text);
        let path = self
            .store
            .save_text(&article.title, &article.body_text)
            .await
            .inspect_err(|e| error!(event = "error", error = %e, "Failed to save text"))?;
        Ok(ScrapeReport::new(&article, None, Some(path), Vec::new()))
    }

    async fn download_images(&self, session: &ScrapeSession, article: &Article) -> Vec<MediaResource> {
        info!(
            event = "start",
            candidates = article.image_candidates.len(),
            "Downloading images"
        );
        let outcomes = run_batch(
            article.image_candidates.iter().cloned(),
            self.config.workers(),
            |source| self.process_image(session, source),
        )
        .await;
        BatchSummary::from_outcomes(&outcomes).log(MediaKind::Image);
        outcomes
    }

    async fn download_videos(&self, session: &ScrapeSession, article: &Article) -> Vec<MediaResource> {
        let candidates = media::video_candidates(&article.raw_html, &self.config.video_providers);
        info!(event = "start", candidates = candidates.len(), "Downloading videos");
        let outcomes = run_batch(candidates, self.config.workers(), |source| {
            self.process_video(session, source)
        })
        .await;
        BatchSummary::from_outcomes(&outcomes).log(MediaKind::Video);
        outcomes
    }

    #[instrument(level = "debug", skip(self, session))]
    async fn process_image(&self, session: &ScrapeSession, source: String) -> MediaResource {
        let mut resource = MediaResource::candidate(source, MediaKind::Image);
        let url = match media::resolve(&resource.source_url, session.page_url()) {
            Ok(url) => url,
            Err(e) => return discard(resource, Rejection::Unresolvable { message: e.to_string() }),
        };
        resource.resolved_url = Some(url.to_string());

        if let Err(rejection) = self.filter.check_url(url.as_str()) {
            return discard(resource, rejection);
        }

        info!(event = "start", url = %truncate_for_log(url.as_str(), LOG_FIELD_MAX), "Downloading image");
        let bytes = match self.fetcher.fetch(&url).await {
            Ok(bytes) => bytes,
            Err(e) => return discard(resource, Rejection::Fetch { message: e.to_string() }),
        };

        let info = match self.filter.check_image(&bytes) {
            Ok(info) => info,
            Err(rejection) => return discard(resource, rejection),
        };

        self.persist(session, resource, &bytes, info.extension()).await
    }

    #[instrument(level = "debug", skip(self, session))]
    async fn process_video(&self, session: &ScrapeSession, source: String) -> MediaResource {
        let mut resource = MediaResource::candidate(source, MediaKind::Video);
        let url = match media::resolve(&resource.source_url, session.page_url()) {
            Ok(url) => url,
            Err(e) => return discard(resource, Rejection::Unresolvable { message: e.to_string() }),
        };
        resource.resolved_url = Some(url.to_string());

        info!(event = "start", url = %truncate_for_log(url.as_str(), LOG_FIELD_MAX), "Downloading video");
        let bytes = match self.fetcher.fetch(&url).await {
            Ok(bytes) => bytes,
            Err(e) => return discard(resource, Rejection::Fetch { message: e.to_string() }),
        };

        self.persist(session, resource, &bytes, VIDEO_EXT).await
    }

    /// Dedup by content hash, then write. The hash stays recorded even if the
    /// write fails.
    async fn persist(
        &self,
        session: &ScrapeSession,
        mut resource: MediaResource,
        bytes: &[u8],
        ext: &str,
    ) -> MediaResource {
        let kind = resource.kind;
        let hash = content_hash(bytes);
        let index = match session.hashes(kind).insert(&hash) {
            Ok(index) => index,
            Err(rejection) => return discard(resource, rejection),
        };

        match self.store.save_media(bytes, kind, index, ext).await {
            Ok(path) => {
                info!(
                    event = "complete",
                    kind = kind.label(),
                    url = %truncate_for_log(
                        resource.resolved_url.as_deref().unwrap_or_default(),
                        LOG_FIELD_MAX
                    ),
                    path = %path.display(),
                    "Saved media"
                );
                resource.downloaded(hash, path)
            }
            Err(e) => {
                resource.content_hash = Some(hash);
                discard(resource, Rejection::Save { message: e.to_string() })
            }
        }
    }
}

/// Log `rejection` under its event category and mark `resource` discarded.
fn discard(resource: MediaResource, rejection: Rejection) -> MediaResource {
    let url = truncate_for_log(
        resource
            .resolved_url
            .as_deref()
            .unwrap_or(&resource.source_url),
        LOG_FIELD_MAX,
    );
    let event = rejection.event();
    if event == "error" {
        warn!(event, kind = resource.kind.label(), %url, reason = %rejection, "Media discarded");
    } else {
        info!(event, kind = resource.kind.label(), %url, reason = %rejection, "Media skipped");
    }
    resource.discarded(rejection)
}
