//! Page-level scraping: turning downloaded HTML into an article and a list of
//! media references.
//!
//! Both submodules are pure functions over the page markup; all network
//! access happens in [`crate::fetcher`].
//!
//! | Module | Produces |
//! |--------|----------|
//! | [`article`] | [`crate::models::Article`] with text, metadata and image candidates |
//! | [`media`] | absolute media URLs and video candidates |

pub mod article;
pub mod media;
