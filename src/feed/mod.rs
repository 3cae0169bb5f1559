//! Feed endpoint client and item model.
//!
//! The feed is a paginated JSON endpoint. Everything above this module talks
//! to it through [`FeedSource`], so the HTTP client can be swapped for the
//! in-memory [`MemoryFeed`] in tests.

mod http;
mod memory;
mod wire;

pub use http::HttpFeed;
pub use memory::MemoryFeed;
pub use wire::{decode_page, page_path};

use thiserror::Error;

/// A single photo card as delivered by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    /// Stable identifier (`nid`), unique across pages
    pub id: String,
    /// Display title
    pub title: String,
    /// Thumbnail image URL, absolute or relative to the feed base URL
    pub thumbnail_url: String,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            thumbnail_url: thumbnail_url.into(),
        }
    }
}

/// Failures talking to the feed endpoint.
///
/// Payloads are rendered strings so results can travel inside
/// [`crate::app::Message`], which is `Clone + Eq`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("request failed: {0}")]
    Network(String),

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The body was not a feed page (malformed JSON or missing `nodes`).
    #[error("malformed feed page: {0}")]
    Decode(String),

    /// Thumbnail bytes could not be decoded as an image.
    #[error("unreadable thumbnail: {0}")]
    Image(String),
}

/// Anything that can serve feed pages and thumbnail bytes.
///
/// Implementations block; callers run them on a background lane.
pub trait FeedSource: Send + Sync {
    /// Fetch page `page` (1-based). An empty vector means end of feed.
    ///
    /// # Errors
    /// Returns [`FeedError`] on transport failure, non-2xx status or a body
    /// that is not a feed page.
    fn fetch_page(&self, page: u32) -> Result<Vec<Item>, FeedError>;

    /// Fetch raw bytes for a thumbnail URL.
    ///
    /// # Errors
    /// Returns [`FeedError`] on transport failure or non-2xx status.
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FeedError>;
}
