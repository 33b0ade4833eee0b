//! # News Media Scraper
//!
//! Fetches a news article page, extracts its text and metadata, discovers the
//! images and videos it references, filters and deduplicates them, downloads
//! the survivors concurrently and writes everything to a content store.
//!
//! ## Architecture
//!
//! The pipeline runs once per article URL:
//! 1. **Fetching**: download the page ([`fetcher`])
//! 2. **Extraction**: build an [`models::Article`] from the HTML ([`scrapers::article`])
//! 3. **Discovery**: collect image candidates and video embeds ([`scrapers::media`])
//! 4. **Filtering**: deny-list, size floor and content-hash dedup ([`filter`])
//! 5. **Downloading**: bounded concurrent batches, images then videos ([`coordinator`])
//! 6. **Output**: text and media files on disk ([`outputs::store`])
//!
//! [`session::Scraper`] ties the steps together and returns a
//! [`models::ScrapeReport`].
//!
//! ## Example
//!
//! ```ignore
//! let config = ScrapeConfig::default();
//! let scraper = Scraper::new(HttpFetcher::new(&config)?, ContentStore::new("output"), config);
//! let report = scraper.scrape_url("https://example.com/news/1").await?;
//! println!("{} images, {} videos", report.n_images_saved, report.n_videos_saved);
//! ```

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod models;
pub mod outputs;
pub mod scrapers;
pub mod session;
pub mod utils;

pub use config::ScrapeConfig;
pub use error::{FetchError, ParseError, Rejection, SaveError, ScrapeError};
pub use fetcher::{Fetch, HttpFetcher};
pub use models::{Article, MediaKind, MediaResource, ScrapeReport};
pub use outputs::store::ContentStore;
pub use session::Scraper;
