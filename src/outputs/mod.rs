//! Persistence of scrape results.
//!
//! - [`store`]: writes article text and media files under an output root
//!
//! The structured [`crate::models::ScrapeReport`] itself is printed as JSON by
//! the binary rather than written here.

pub mod store;
