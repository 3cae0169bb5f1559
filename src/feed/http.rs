//! Blocking HTTP implementation of [`FeedSource`].

use std::time::Duration;

use reqwest::blocking::Client;

use super::{FeedError, FeedSource, Item, decode_page, page_path};

/// Feed endpoint reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: Client,
    base_url: String,
}

impl HttpFeed {
    /// Build a client for the feed rooted at `base_url`.
    ///
    /// # Errors
    /// Returns [`FeedError::Network`] if the TLS backend cannot be initialised.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("photofeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| FeedError::Network(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a possibly relative URL against the base URL.
    pub fn resolve_url(&self, url: &str) -> String {
        resolve_against(&self.base_url, url)
    }

    fn get(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| FeedError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|err| FeedError::Network(err.to_string()))
    }
}

impl FeedSource for HttpFeed {
    fn fetch_page(&self, page: u32) -> Result<Vec<Item>, FeedError> {
        let url = format!("{}{}", self.base_url, page_path(page));
        tracing::debug!(page, %url, "fetching feed page");
        let body = self.get(&url)?;
        decode_page(&body)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        self.get(&self.resolve_url(url))
    }
}

fn resolve_against(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    if let Some(rest) = url.strip_prefix("//") {
        let scheme = base.split_once("://").map_or("https", |(scheme, _)| scheme);
        return format!("{scheme}://{rest}");
    }
    if url.starts_with('/') {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}
