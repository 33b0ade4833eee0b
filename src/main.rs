//! Command-line entry point.
//!
//! ```sh
//! news_media_scraper https://example.com/news/1
//! news_media_scraper --text story.txt --title "Harbour reopens"
//! ```
//!
//! The structured report is printed to stdout as JSON; progress goes to the
//! tracing subscriber on stderr.

use clap::Parser;
use news_media_scraper::cli::{Cli, Input};
use news_media_scraper::utils::ensure_writable_dir;
use news_media_scraper::{ContentStore, HttpFetcher, ScrapeConfig, Scraper};
use std::error::Error;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_media_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // --- Config: file, then CLI overrides ---
    let mut config = match &args.config {
        Some(path) => ScrapeConfig::load(path).await?,
        None => ScrapeConfig::default(),
    };
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }

    // Early check: output root must be writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let fetcher = HttpFetcher::new(&config)?;
    let scraper = Scraper::new(fetcher, ContentStore::new(&args.output_dir), config);

    let result = match args.input() {
        Some(Input::Url(url)) => scraper.scrape_url(&url).await,
        Some(Input::Text { path, title }) => {
            let text = read_text(&path).await?;
            scraper.scrape_text(title.as_deref(), &text).await
        }
        None => return Err("either a URL or --text is required".into()),
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Scrape failed");
            return Err(e.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        images = report.n_images_saved,
        videos = report.n_videos_saved,
        "Execution complete"
    );
    Ok(())
}

async fn read_text(path: &std::path::Path) -> Result<String, Box<dyn Error>> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        Ok(text)
    } else {
        Ok(tokio::fs::read_to_string(path).await?)
    }
}
