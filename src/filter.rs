//! Media acceptance policy and session-scoped deduplication.
//!
//! Image candidates pass four gates, in order; the first failing gate decides
//! the [`Rejection`]:
//!
//! 1. keyword deny-list on the URL (checked before any download)
//! 2. download
//! 3. decoded dimensions against the configured floor
//! 4. content hash against the session's [`SeenHashes`]
//!
//! Videos skip gates 1 and 3.

use crate::config::ScrapeConfig;
use crate::error::Rejection;
use image::{ImageFormat, ImageReader};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Mutex;

/// Extension used when the image format cannot be detected.
pub const FALLBACK_IMAGE_EXT: &str = "jpg";

/// Dimensions and format of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
}

impl ImageInfo {
    /// Lowercase format name used as the saved file's extension.
    pub fn extension(&self) -> &'static str {
        match self.format {
            Some(ImageFormat::Jpeg) => "jpeg",
            Some(ImageFormat::Png) => "png",
            Some(ImageFormat::Gif) => "gif",
            Some(ImageFormat::WebP) => "webp",
            Some(ImageFormat::Bmp) => "bmp",
            Some(ImageFormat::Tiff) => "tiff",
            Some(ImageFormat::Ico) => "ico",
            Some(other) => other
                .extensions_str()
                .first()
                .copied()
                .unwrap_or(FALLBACK_IMAGE_EXT),
            None => FALLBACK_IMAGE_EXT,
        }
    }
}

/// Keyword and dimension checks built from a [`ScrapeConfig`].
#[derive(Debug, Clone)]
pub struct MediaFilter {
    deny_keywords: Vec<String>,
    min_width: u32,
    min_height: u32,
}

impl MediaFilter {
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            deny_keywords: config
                .deny_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            min_width: config.min_image_width,
            min_height: config.min_image_height,
        }
    }

    /// Reject `url` if its lowercase form contains a deny-listed keyword.
    ///
    /// This is a plain substring match, so `ad` also hits `/uploads/` or
    /// `/headline.jpg`.
    pub fn check_url(&self, url: &str) -> Result<(), Rejection> {
        let lowered = url.to_lowercase();
        match self
            .deny_keywords
            .iter()
            .find(|keyword| lowered.contains(keyword.as_str()))
        {
            Some(keyword) => Err(Rejection::Keyword {
                keyword: keyword.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Decode enough of `bytes` to learn the image size, and enforce the floor.
    ///
    /// # Returns
    ///
    /// The decoded [`ImageInfo`] when both sides reach the configured minimum,
    /// [`Rejection::TooSmall`] when either falls short, and
    /// [`Rejection::Undecodable`] when the header cannot be read.
    pub fn check_image(&self, bytes: &[u8]) -> Result<ImageInfo, Rejection> {
        let info = inspect_image(bytes)?;
        if info.width < self.min_width || info.height < self.min_height {
            return Err(Rejection::TooSmall {
                width: info.width,
                height: info.height,
                min_width: self.min_width,
                min_height: self.min_height,
            });
        }
        Ok(info)
    }
}

/// Read image dimensions and format from the header of `bytes`.
pub fn inspect_image(bytes: &[u8]) -> Result<ImageInfo, Rejection> {
    let undecodable = |e: &dyn std::fmt::Display| Rejection::Undecodable {
        message: e.to_string(),
    };
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| undecodable(&e))?;
    let format = reader.format();
    let (width, height) = reader.into_dimensions().map_err(|e| undecodable(&e))?;
    Ok(ImageInfo {
        width,
        height,
        format,
    })
}

/// Hex SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Append-only set of content hashes for one media kind in one session.
///
/// The membership check, the insert and the accepted counter share one lock,
/// so two workers racing on equal bytes can never both be accepted.
#[derive(Debug, Default)]
pub struct SeenHashes {
    inner: Mutex<HashSet<String>>,
}

impl SeenHashes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `hash`. Returns the 1-based accepted index, or
    /// [`Rejection::Duplicate`] if the hash was already recorded.
    pub fn insert(&self, hash: &str) -> Result<usize, Rejection> {
        let mut seen = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if seen.insert(hash.to_string()) {
            Ok(seen.len())
        } else {
            Err(Rejection::Duplicate {
                hash: hash.to_string(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    /// Encode a `width` x `height` image whose pixels depend on `seed`, so
    /// different seeds give different bytes.
    pub fn encoded_image(width: u32, height: u32, seed: u8, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([seed, (x % 251) as u8, (y % 241) as u8])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), format)
            .unwrap();
        buf
    }

    pub fn png(width: u32, height: u32, seed: u8) -> Vec<u8> {
        encoded_image(width, height, seed, ImageFormat::Png)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{encoded_image, png};
    use super::*;
    use std::sync::Arc;

    fn filter() -> MediaFilter {
        MediaFilter::new(&ScrapeConfig::default())
    }

    #[test]
    fn test_keyword_filter_is_case_insensitive() {
        let f = filter();
        assert_eq!(
            f.check_url("https://x.test/static/SiteLogo.png"),
            Err(Rejection::Keyword {
                keyword: "logo".into()
            })
        );
        assert!(f.check_url("https://x.test/img/BANNER-top.jpg").is_err());
        assert!(f.check_url("https://x.test/sponsor/1.jpg").is_err());
        assert!(f.check_url("https://x.test/photos/harbour.jpg").is_ok());
    }

    #[test]
    fn test_keyword_filter_substring_semantics() {
        // `ad` is a substring of `uploads`.
        assert!(filter().check_url("https://x.test/uploads/photo.jpg").is_err());
    }

    #[test]
    fn test_check_image_accepts_at_floor() {
        let info = filter().check_image(&png(100, 100, 1)).unwrap();
        assert_eq!((info.width, info.height), (100, 100));
        assert_eq!(info.extension(), "png");
    }

    #[test]
    fn test_check_image_rejects_either_side_below_floor() {
        let f = filter();
        assert!(matches!(
            f.check_image(&png(99, 400, 1)),
            Err(Rejection::TooSmall { width: 99, .. })
        ));
        assert!(matches!(
            f.check_image(&png(400, 20, 1)),
            Err(Rejection::TooSmall { height: 20, .. })
        ));
    }

    #[test]
    fn test_check_image_rejects_garbage() {
        assert!(matches!(
            filter().check_image(b"definitely not an image"),
            Err(Rejection::Undecodable { .. })
        ));
    }

    #[test]
    fn test_extension_follows_decoded_format() {
        let jpeg = inspect_image(&encoded_image(120, 120, 3, ImageFormat::Jpeg)).unwrap();
        assert_eq!(jpeg.extension(), "jpeg");

        let unknown = ImageInfo {
            width: 1,
            height: 1,
            format: None,
        };
        assert_eq!(unknown.extension(), "jpg");
    }

    #[test]
    fn test_content_hash_is_stable_hex() {
        let a = content_hash(b"abc");
        assert_eq!(
            a,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(a, content_hash(b"abd"));
    }

    #[test]
    fn test_seen_hashes_rejects_second_insert() {
        let seen = SeenHashes::new();
        assert_eq!(seen.insert("h1"), Ok(1));
        assert_eq!(seen.insert("h2"), Ok(2));
        assert_eq!(
            seen.insert("h1"),
            Err(Rejection::Duplicate { hash: "h1".into() })
        );
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_seen_hashes_single_winner_across_threads() {
        let seen = Arc::new(SeenHashes::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let seen = Arc::clone(&seen);
                std::thread::spawn(move || seen.insert("same").is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(seen.len(), 1);
    }
}
