//! Command-line interface definitions.
//!
//! Options can be given as flags or, where noted, environment variables.
//! The filter policy (keywords, providers, image floor) lives in the optional
//! YAML config file; see [`crate::config`].

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Scrape an article page into ./output
/// news_media_scraper https://example.com/news/1
///
/// # Store pasted text instead, no network access
/// news_media_scraper --text article.txt --title "Harbour reopens"
///
/// # Custom output root and policy
/// news_media_scraper -o /data/scrapes -c scrape.yaml https://example.com/news/1
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Absolute URL of the article page
    #[arg(required_unless_present = "text")]
    pub url: Option<String>,

    /// Read raw article text from this file (`-` for stdin) instead of fetching a page
    #[arg(long, conflicts_with = "url")]
    pub text: Option<PathBuf>,

    /// Title stored with raw text
    #[arg(long, requires = "text")]
    pub title: Option<String>,

    /// Root directory for text/, images/ and videos/
    #[arg(short, long, env = "SCRAPER_OUTPUT_DIR", default_value = "output")]
    pub output_dir: String,

    /// Optional path to a YAML scrape config
    #[arg(short, long, env = "SCRAPER_CONFIG")]
    pub config: Option<String>,

    /// Concurrent media downloads per batch (overrides the config file)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds (overrides the config file)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// What the caller asked to scrape.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Url(String),
    Text { path: PathBuf, title: Option<String> },
}

impl Cli {
    pub fn input(&self) -> Option<Input> {
        match (&self.url, &self.text) {
            (Some(url), _) => Some(Input::Url(url.clone())),
            (None, Some(path)) => Some(Input::Text {
                path: path.clone(),
                title: self.title.clone(),
            }),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_url() {
        let cli = Cli::parse_from(["news_media_scraper", "https://example.com/news/1"]);

        assert_eq!(
            cli.input(),
            Some(Input::Url("https://example.com/news/1".into()))
        );
        assert_eq!(cli.output_dir, "output");
    }

    #[test]
    fn test_cli_text_with_title() {
        let cli = Cli::parse_from([
            "news_media_scraper",
            "--text",
            "story.txt",
            "--title",
            "Harbour reopens",
            "-o",
            "/tmp/out",
        ]);

        assert_eq!(
            cli.input(),
            Some(Input::Text {
                path: PathBuf::from("story.txt"),
                title: Some("Harbour reopens".into()),
            })
        );
        assert_eq!(cli.output_dir, "/tmp/out");
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "news_media_scraper",
            "--concurrency",
            "4",
            "--timeout",
            "5",
            "-c",
            "scrape.yaml",
            "https://example.com/a",
        ]);

        assert_eq!(cli.concurrency, Some(4));
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.config.as_deref(), Some("scrape.yaml"));
    }

    #[test]
    fn test_cli_requires_some_input() {
        assert!(Cli::try_parse_from(["news_media_scraper"]).is_err());
        assert!(
            Cli::try_parse_from([
                "news_media_scraper",
                "--text",
                "a.txt",
                "https://example.com/a"
            ])
            .is_err()
        );
    }
}
