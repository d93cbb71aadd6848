//! In-memory fetcher for testing.

use crate::Fetcher;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Fetcher that serves canned bodies from a map and counts every request.
///
/// Unknown URLs answer with a 404 [`Status`](ErrorKind::Status) error, the
/// same way an [`HttpFetcher`](crate::HttpFetcher) reports a missing page.
///
/// # Examples
///
/// ```
/// use hymnal_fetch::{Fetcher, MockFetcher};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = MockFetcher::with_responses([
///     ("https://hymnary.org/sitemap.xml", b"<sitemapindex/>".to_vec()),
/// ]);
/// assert_eq!(fetcher.fetch("https://hymnary.org/sitemap.xml").await?, b"<sitemapindex/>");
/// assert!(fetcher.fetch("https://hymnary.org/missing.xml").await.is_err());
/// assert_eq!(fetcher.calls(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn with_responses(responses: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|(url, body)| (url.into(), body.into())).collect()),
            ..Self::default()
        }
    }

    /// Add or replace the body served for `url`.
    pub fn insert(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        let mut responses = self.responses.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        responses.insert(url.into(), body.into());
    }

    /// Total number of fetches attempted, successful or not.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    /// Number of fetches attempted for one URL.
    pub fn calls_for(&self, url: &str) -> usize {
        let requests = self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        requests.iter().filter(|requested| requested.as_str() == url).count()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(url.to_string());
        let responses = self.responses.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match responses.get(url) {
            Some(body) => Ok(body.clone()),
            None => exn::bail!(ErrorKind::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
