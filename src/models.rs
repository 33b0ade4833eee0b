//! Data models for scraped articles and their media.
//!
//! - [`Article`]: canonical record extracted from one page
//! - [`MediaResource`]: one image or video candidate and where it ended up
//! - [`ScrapeReport`]: the structured result handed back to callers

use crate::error::Rejection;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Article content extracted from a fetched page.
///
/// Built once per scrape by the extractor and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Article {
    /// Headline; empty when the page exposes none.
    pub title: String,
    /// Main body text, paragraphs separated by a blank line.
    pub body_text: String,
    /// Author names in document order, without duplicates.
    pub authors: Vec<String>,
    pub publish_date: Option<DateTime<FixedOffset>>,
    /// The page HTML as downloaded. Not serialized into reports.
    #[serde(skip)]
    pub raw_html: String,
    /// Image URLs found on the page, as written in the markup.
    pub image_candidates: BTreeSet<String>,
}

impl Article {
    /// Article for caller-supplied text, with no page behind it.
    pub fn from_text(title: Option<&str>, body: &str) -> Self {
        Article {
            title: title.unwrap_or_default().trim().to_string(),
            body_text: body.to_string(),
            ..Article::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Filename stem prefix and store subdirectory for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Lifecycle of a media candidate. `Downloaded` and `Discarded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaStatus {
    Candidate,
    Downloaded,
    Discarded,
}

/// One image or video reference discovered on the page.
#[derive(Debug, Clone, Serialize)]
pub struct MediaResource {
    /// URL as it appeared in the markup.
    pub source_url: String,
    pub kind: MediaKind,
    /// Absolute URL the download was attempted from.
    pub resolved_url: Option<String>,
    /// Hex SHA-256 of the downloaded bytes.
    pub content_hash: Option<String>,
    pub local_path: Option<PathBuf>,
    pub status: MediaStatus,
    /// Set when `status` is `Discarded`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
}

impl MediaResource {
    pub fn candidate(source_url: impl Into<String>, kind: MediaKind) -> Self {
        MediaResource {
            source_url: source_url.into(),
            kind,
            resolved_url: None,
            content_hash: None,
            local_path: None,
            status: MediaStatus::Candidate,
            rejection: None,
        }
    }

    pub fn downloaded(mut self, hash: String, path: PathBuf) -> Self {
        self.content_hash = Some(hash);
        self.local_path = Some(path);
        self.status = MediaStatus::Downloaded;
        self
    }

    pub fn discarded(mut self, rejection: Rejection) -> Self {
        self.status = MediaStatus::Discarded;
        self.rejection = Some(rejection);
        self
    }

    pub fn is_downloaded(&self) -> bool {
        self.status == MediaStatus::Downloaded
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        self.rejection.as_ref()
    }
}

/// Metadata block of a report.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleMetadata {
    pub title: String,
    pub url: Option<String>,
    pub authors: Vec<String>,
    pub publish_date: Option<DateTime<FixedOffset>>,
}

/// Result of one scrape session.
#[derive(Debug, Serialize)]
pub struct ScrapeReport {
    pub metadata: ArticleMetadata,
    pub body_text: String,
    /// Saved article text; `None` if writing it failed.
    pub text_path: Option<PathBuf>,
    pub n_images_saved: usize,
    pub n_videos_saved: usize,
    pub media: Vec<MediaResource>,
}

impl ScrapeReport {
    pub fn new(
        article: &Article,
        url: Option<&str>,
        text_path: Option<PathBuf>,
        media: Vec<MediaResource>,
    ) -> Self {
        let saved = |kind: MediaKind| {
            media
                .iter()
                .filter(|m| m.kind == kind && m.is_downloaded())
                .count()
        };
        ScrapeReport {
            metadata: ArticleMetadata {
                title: article.title.clone(),
                url: url.map(str::to_string),
                authors: article.authors.clone(),
                publish_date: article.publish_date,
            },
            body_text: article.body_text.clone(),
            text_path,
            n_images_saved: saved(MediaKind::Image),
            n_videos_saved: saved(MediaKind::Video),
            media,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_trims_title() {
        let article = Article::from_text(Some("  Headline \n"), "Body");
        assert_eq!(article.title, "Headline");
        assert_eq!(article.body_text, "Body");
        assert!(article.image_candidates.is_empty());

        let untitled = Article::from_text(None, "Body");
        assert_eq!(untitled.title, "");
    }

    #[test]
    fn test_media_lifecycle() {
        let candidate = MediaResource::candidate("/a.png", MediaKind::Image);
        assert_eq!(candidate.status, MediaStatus::Candidate);

        let saved = candidate
            .clone()
            .downloaded("abc".into(), PathBuf::from("images/image_1.png"));
        assert!(saved.is_downloaded());
        assert_eq!(saved.content_hash.as_deref(), Some("abc"));

        let dropped = candidate.discarded(Rejection::Keyword {
            keyword: "ad".into(),
        });
        assert!(!dropped.is_downloaded());
        assert!(matches!(dropped.rejection(), Some(Rejection::Keyword { .. })));
    }

    #[test]
    fn test_report_counts_per_kind() {
        let article = Article::from_text(Some("T"), "B");
        let media = vec![
            MediaResource::candidate("a", MediaKind::Image).downloaded("1".into(), "a".into()),
            MediaResource::candidate("b", MediaKind::Image).discarded(Rejection::Duplicate {
                hash: "1".into(),
            }),
            MediaResource::candidate("c", MediaKind::Video).downloaded("2".into(), "c".into()),
        ];
        let report = ScrapeReport::new(&article, Some("https://x.test/"), Some("t.txt".into()), media);
        assert_eq!(report.n_images_saved, 1);
        assert_eq!(report.n_videos_saved, 1);
        assert_eq!(report.metadata.url.as_deref(), Some("https://x.test/"));
    }

    #[test]
    fn test_discarded_status_serializes_reason() {
        let resource = MediaResource::candidate("a", MediaKind::Image).discarded(Rejection::Keyword {
            keyword: "logo".into(),
        });
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["kind"], "image");
        assert_eq!(json["status"], "discarded");
        assert_eq!(json["rejection"]["reason"], "keyword");
        assert_eq!(json["rejection"]["keyword"], "logo");
    }
}
