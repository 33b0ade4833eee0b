//! Article extraction from a downloaded HTML page.
//!
//! The extractor is heuristic and best-effort. A page without a recognizable
//! article body still produces an [`Article`], possibly with an empty title or
//! body; only an empty document is an error.
//!
//! # Sources, in priority order
//!
//! | Field | Taken from |
//! |-------|------------|
//! | title | `og:title`, `<title>`, first `<h1>` |
//! | body | `<p>` inside `article`, `main`, `[itemprop=articleBody]`, `.post-content`, `.entry-content`, `#content`; else every `<p>` |
//! | authors | `meta[name=author]`, `article:author`, `[rel=author]`, `[itemprop=author]` |
//! | publish date | `article:published_time`, `pubdate`, `datePublished`, `<time datetime>` |
//! | images | `og:image`, `<img src>` (or `data-src`) |

use crate::error::ParseError;
use crate::models::Article;
use crate::utils::{LOG_FIELD_MAX, truncate_for_log};
use chrono::{DateTime, FixedOffset, NaiveDate};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

const BODY_CONTAINERS: &[&str] = &[
    "article",
    "main",
    "[itemprop=articleBody]",
    ".post-content",
    ".entry-content",
    "#content",
];

const DATE_META: &[&str] = &[
    "meta[property='article:published_time']",
    "meta[name=pubdate]",
    "meta[name=publishdate]",
    "meta[itemprop=datePublished]",
];

static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property='og:title']").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static AUTHOR_META: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[name=author], meta[property='article:author']").unwrap()
});
static AUTHOR_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[rel=author], [itemprop=author]").unwrap());
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time[datetime]").unwrap());
static OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property='og:image']").unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Build an [`Article`] from `raw_html` downloaded from `page_url`.
#[instrument(level = "info", skip_all, fields(%page_url))]
pub fn extract(raw_html: &str, page_url: &Url) -> Result<Article, ParseError> {
    if raw_html.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }
    let document = Html::parse_document(raw_html);

    let title = extract_title(&document);
    let body_text = extract_body(&document);
    if body_text.is_empty() {
        warn!("No article body found");
    }

    let article = Article {
        title,
        body_text,
        authors: extract_authors(&document),
        publish_date: extract_publish_date(&document),
        raw_html: raw_html.to_string(),
        image_candidates: extract_images(&document),
    };

    info!(
        title = %truncate_for_log(&article.title, LOG_FIELD_MAX),
        bytes = article.body_text.len(),
        authors = article.authors.len(),
        images = article.image_candidates.len(),
        "Parsed article"
    );
    Ok(article)
}

/// Collapse runs of whitespace to single spaces.
fn squash(text: &str) -> String {
    text.split_whitespace().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    squash(&element.text().collect::<String>())
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(squash)
        .find(|s| !s.is_empty())
}

fn extract_title(document: &Html) -> String {
    meta_content(document, &OG_TITLE)
        .or_else(|| {
            document
                .select(&TITLE)
                .map(element_text)
                .find(|s| !s.is_empty())
        })
        .or_else(|| document.select(&H1).map(element_text).find(|s| !s.is_empty()))
        .unwrap_or_default()
}

fn paragraphs<'a>(root: impl Iterator<Item = ElementRef<'a>>) -> String {
    root.map(element_text).filter(|p| !p.is_empty()).join("\n\n")
}

fn extract_body(document: &Html) -> String {
    for container in BODY_CONTAINERS {
        let Ok(selector) = Selector::parse(container) else {
            continue;
        };
        if let Some(root) = document.select(&selector).next() {
            let body = paragraphs(root.select(&PARAGRAPH));
            if !body.is_empty() {
                debug!(container, "Body found in container");
                return body;
            }
        }
    }
    paragraphs(document.select(&PARAGRAPH))
}

fn clean_author(raw: &str) -> Option<String> {
    let name = squash(raw);
    let name = name
        .strip_prefix("By ")
        .or_else(|| name.strip_prefix("by "))
        .unwrap_or(&name)
        .trim()
        .to_string();
    // `article:author` often holds a profile URL rather than a name.
    if name.is_empty() || name.starts_with("http://") || name.starts_with("https://") {
        None
    } else {
        Some(name)
    }
}

fn extract_authors(document: &Html) -> Vec<String> {
    let from_meta = document
        .select(&AUTHOR_META)
        .filter_map(|el| el.value().attr("content"))
        .map(str::to_string);
    let from_markup = document
        .select(&AUTHOR_TEXT)
        .map(|el| el.text().collect::<String>());

    from_meta
        .chain(from_markup)
        .filter_map(|raw| clean_author(&raw))
        .unique()
        .collect()
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date as UTC midnight.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc().fixed_offset())
}

fn extract_publish_date(document: &Html) -> Option<DateTime<FixedOffset>> {
    let from_meta = DATE_META.iter().find_map(|sel| {
        let selector = Selector::parse(sel).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .find_map(parse_date)
    });

    from_meta.or_else(|| {
        document
            .select(&TIME)
            .filter_map(|el| el.value().attr("datetime"))
            .find_map(parse_date)
    })
}

fn extract_images(document: &Html) -> BTreeSet<String> {
    let og = document
        .select(&OG_IMAGE)
        .filter_map(|el| el.value().attr("content"));
    let inline = document.select(&IMG).filter_map(|el| {
        let attrs = el.value();
        attrs
            .attr("src")
            .filter(|s| !s.trim().is_empty())
            .or_else(|| attrs.attr("data-src"))
    });

    og.chain(inline)
        .map(str::trim)
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://example.com/news/1").unwrap()
    }

    const STORY: &str = r#"
        <html>
          <head>
            <title>Fallback Title | Site</title>
            <meta property="og:title" content="Harbour  reopens after storm">
            <meta name="author" content="Jane Doe">
            <meta property="article:author" content="https://example.com/staff/jane">
            <meta property="article:published_time" content="2025-01-23T08:30:00+08:00">
            <meta property="og:image" content="https://cdn.example.com/lead.jpg">
          </head>
          <body>
            <nav><p>Home | World</p></nav>
            <article>
              <h1>Harbour reopens after storm</h1>
              <span rel="author">By John   Smith</span>
              <p>The harbour reopened on Thursday.</p>
              <p>
                Ships queued   overnight.
              </p>
              <img src="/img/harbour.jpg">
              <img data-src="/img/lazy.jpg">
              <img src="data:image/gif;base64,R0lGOD">
              <img src="/img/harbour.jpg">
            </article>
          </body>
        </html>
    "#;

    #[test]
    fn test_extract_full_article() {
        let article = extract(STORY, &page()).unwrap();

        assert_eq!(article.title, "Harbour reopens after storm");
        assert_eq!(
            article.body_text,
            "The harbour reopened on Thursday.\n\nShips queued overnight."
        );
        assert_eq!(article.authors, vec!["Jane Doe", "John Smith"]);
        assert_eq!(
            article.publish_date.unwrap().to_rfc3339(),
            "2025-01-23T08:30:00+08:00"
        );
        assert_eq!(article.raw_html, STORY);
    }

    #[test]
    fn test_extract_image_candidates() {
        let article = extract(STORY, &page()).unwrap();
        let images: Vec<&str> = article.image_candidates.iter().map(String::as_str).collect();

        assert_eq!(
            images,
            vec![
                "/img/harbour.jpg",
                "/img/lazy.jpg",
                "https://cdn.example.com/lead.jpg",
            ]
        );
    }

    #[test]
    fn test_extract_is_best_effort_without_body() {
        let html = "<html><head></head><body><div>just a div</div></body></html>";
        let article = extract(html, &page()).unwrap();

        assert_eq!(article.title, "");
        assert_eq!(article.body_text, "");
        assert!(article.authors.is_empty());
        assert!(article.publish_date.is_none());
    }

    #[test]
    fn test_extract_falls_back_to_all_paragraphs() {
        let html = "<html><head><title>Plain</title></head><body><div><p>One</p></div><p>Two</p></body></html>";
        let article = extract(html, &page()).unwrap();

        assert_eq!(article.title, "Plain");
        assert_eq!(article.body_text, "One\n\nTwo");
    }

    #[test]
    fn test_extract_empty_document_is_error() {
        assert!(matches!(
            extract("   \n", &page()),
            Err(ParseError::EmptyDocument)
        ));
    }

    #[test]
    fn test_parse_date_variants() {
        assert!(parse_date("2025-01-23T08:30:00Z").is_some());
        let day = parse_date("2025-01-23").unwrap();
        assert_eq!(day.to_rfc3339(), "2025-01-23T00:00:00+00:00");
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_time_element_date() {
        let html = r#"<p>x</p><time datetime="2024-12-01">Dec 1</time>"#;
        let article = extract(html, &page()).unwrap();
        assert_eq!(
            article.publish_date.unwrap().to_rfc3339(),
            "2024-12-01T00:00:00+00:00"
        );
    }
}
