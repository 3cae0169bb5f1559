//! In-memory [`FeedSource`] for tests and offline demos.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{FeedError, FeedSource, Item};

#[derive(Debug, Default)]
struct Inner {
    pages: HashMap<u32, Result<Vec<Item>, FeedError>>,
    images: HashMap<String, Vec<u8>>,
    requested: Vec<u32>,
}

/// A feed whose pages are scripted up front.
///
/// Pages that were never scripted are empty, i.e. end of feed.
#[derive(Debug, Default)]
pub struct MemoryFeed {
    inner: Mutex<Inner>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script page `page` to return `items`.
    #[must_use]
    pub fn with_page(self, page: u32, items: Vec<Item>) -> Self {
        self.lock().pages.insert(page, Ok(items));
        self
    }

    /// Script page `page` to fail with `error`.
    #[must_use]
    pub fn with_failure(self, page: u32, error: FeedError) -> Self {
        self.lock().pages.insert(page, Err(error));
        self
    }

    /// Serve `bytes` for thumbnail `url`.
    #[must_use]
    pub fn with_image(self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.lock().images.insert(url.into(), bytes);
        self
    }

    /// Replace page `page` after construction.
    pub fn set_page(&self, page: u32, outcome: Result<Vec<Item>, FeedError>) {
        self.lock().pages.insert(page, outcome);
    }

    /// Page numbers requested so far, in request order.
    pub fn requested_pages(&self) -> Vec<u32> {
        self.lock().requested.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl FeedSource for MemoryFeed {
    fn fetch_page(&self, page: u32) -> Result<Vec<Item>, FeedError> {
        let mut inner = self.lock();
        inner.requested.push(page);
        inner.pages.get(&page).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        self.lock()
            .images
            .get(url)
            .cloned()
            .ok_or_else(|| FeedError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}
