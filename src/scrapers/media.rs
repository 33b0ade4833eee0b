//! Media URL resolution and video discovery.
//!
//! # Resolution rule
//!
//! A reference that already carries a scheme (`https:`, `http:`, `data:`, ...)
//! is used as is. Anything else is treated as a host-rooted path and rebuilt
//! from the page's scheme and host:
//!
//! ```text
//! page      https://example.com/news/1
//! /img/a.png  ->  https://example.com/img/a.png
//! img/a.png   ->  https://example.com/img/a.png
//! ```
//!
//! Relative segments are not merged with the page path, so `../a.png` under
//! a nested page resolves against the host root. Protocol-relative references
//! (`//cdn.example.com/a.png`) are likewise appended to the page host.
//!
//! # Video discovery
//!
//! Videos come from `<video src>`, `<video><source src>` and from `<iframe
//! src>` elements whose URL contains one of the configured provider markers.
//! Every other iframe is ignored.

use crate::error::ParseError;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

static SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());
static VIDEO_SRC: Lazy<Selector> =
    Lazy::new(|| Selector::parse("video[src], video source[src]").unwrap());
static IFRAME_SRC: Lazy<Selector> = Lazy::new(|| Selector::parse("iframe[src]").unwrap());

/// True when `reference` starts with a URL scheme.
pub fn has_scheme(reference: &str) -> bool {
    SCHEME.is_match(reference)
}

/// Turn a media reference from `page_url` into an absolute URL.
///
/// # Arguments
///
/// * `reference` - an `src` value as written in the page, absolute or relative
/// * `page_url` - the article URL the reference was found on
///
/// # Returns
///
/// The reference unchanged if it carries a scheme. Otherwise the page's
/// scheme and host (and port) followed by the reference as a host-rooted
/// path; the page path is never merged in. Fails with
/// [`ParseError::MissingHost`] for a host-less page URL, or
/// [`ParseError::InvalidUrl`] if the rebuilt string does not parse.
///
/// # Examples
///
/// ```ignore
/// let page = Url::parse("https://example.com/news/1")?;
/// assert_eq!(resolve("/img/a.png", &page)?.as_str(), "https://example.com/img/a.png");
/// assert_eq!(resolve("img/a.png", &page)?.as_str(), "https://example.com/img/a.png");
/// ```
pub fn resolve(reference: &str, page_url: &Url) -> Result<Url, ParseError> {
    let reference = reference.trim();
    let absolute = if has_scheme(reference) {
        reference.to_string()
    } else {
        let host = page_url
            .host_str()
            .ok_or_else(|| ParseError::MissingHost(page_url.to_string()))?;
        let authority = match page_url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let sep = if reference.starts_with('/') { "" } else { "/" };
        format!("{}://{}{}{}", page_url.scheme(), authority, sep, reference)
    };

    Url::parse(&absolute).map_err(|source| ParseError::InvalidUrl {
        url: absolute,
        source,
    })
}

/// Collect video references from `raw_html`, in document order, without
/// duplicates. References are returned as written; resolve them with
/// [`resolve`] before downloading.
pub fn video_candidates(raw_html: &str, providers: &[String]) -> Vec<String> {
    let document = Html::parse_document(raw_html);

    let direct = document
        .select(&VIDEO_SRC)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty());

    let embedded = document
        .select(&IFRAME_SRC)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .filter(|src| providers.iter().any(|marker| src.contains(marker.as_str())));

    let urls: Vec<String> = direct.chain(embedded).map(str::to_string).unique().collect();
    debug!(count = urls.len(), "Discovered video references");
    urls
}
