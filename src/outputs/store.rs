//! Filesystem content store for article text and downloaded media.
//!
//! # Layout
//!
//! ```text
//! output/
//! ├── text/
//! │   └── <sanitized title>.txt
//! ├── images/
//! │   ├── image_1.jpeg
//! │   └── image_2.png
//! └── videos/
//!     └── video_1.mp4
//! ```
//!
//! Subdirectories are created on first write. Media indices come from the
//! session's dedup sets, so concurrent saves never share a filename.

use crate::error::SaveError;
use crate::models::MediaKind;
use crate::utils::sanitize_filename;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Extension given to every saved video.
pub const VIDEO_EXT: &str = "mp4";

/// Stem used when a title sanitizes to nothing.
const UNTITLED: &str = "untitled";

#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn text_dir(&self) -> PathBuf {
        self.root.join("text")
    }

    pub fn media_dir(&self, kind: MediaKind) -> PathBuf {
        match kind {
            MediaKind::Image => self.root.join("images"),
            MediaKind::Video => self.root.join("videos"),
        }
    }

    /// Write `title`, a blank line, then `body` verbatim.
    #[instrument(level = "info", skip_all, fields(root = %self.root.display()))]
    pub async fn save_text(&self, title: &str, body: &str) -> Result<PathBuf, SaveError> {
        let mut stem = sanitize_filename(title);
        if stem.trim().is_empty() {
            stem = UNTITLED.to_string();
        }
        let path = self.text_dir().join(format!("{stem}.txt"));

        let mut contents = String::with_capacity(title.len() + body.len() + 2);
        contents.push_str(title);
        contents.push_str("\n\n");
        contents.push_str(body);

        write_file(&path, contents.as_bytes()).await?;
        info!(path = %path.display(), "Saved article text");
        Ok(path)
    }

    /// Write one media file as `<kind>_<index>.<ext>`. Videos always use
    /// [`VIDEO_EXT`]; `ext` is only consulted for images.
    ///
    /// # Arguments
    ///
    /// * `index` - the 1-based slot handed out by the session's hash set
    /// * `ext` - image extension from the decoded format
    ///
    /// # Returns
    ///
    /// The written path, or a [`SaveError`] naming it.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let path = store.save_media(&bytes, MediaKind::Image, 3, "png").await?;
    /// assert!(path.ends_with("images/image_3.png"));
    /// ```
    #[instrument(level = "debug", skip(self, bytes), fields(len = bytes.len()))]
    pub async fn save_media(
        &self,
        bytes: &[u8],
        kind: MediaKind,
        index: usize,
        ext: &str,
    ) -> Result<PathBuf, SaveError> {
        let ext = match kind {
            MediaKind::Image => ext,
            MediaKind::Video => VIDEO_EXT,
        };
        let path = self
            .media_dir(kind)
            .join(format!("{}_{}.{}", kind.label(), index, ext));
        write_file(&path, bytes).await?;
        Ok(path)
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), SaveError> {
    let wrap = |source| SaveError {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(wrap(e));
        }
    }
    fs::write(path, bytes).await.map_err(wrap)
}
