//! Retrieval of remote sitemap resources.
//!
//! The [`Fetcher`] trait is the only thing the rest of the workspace knows
//! about the network: give it an absolute URL, get the raw response body back.
//! Bodies are returned untouched (a `.xml.gz` sitemap stays gzip-compressed).

pub mod error;
mod http;
#[cfg(feature = "mock")]
mod mock;

use crate::error::Result;
pub use crate::http::HttpFetcher;
#[cfg(feature = "mock")]
pub use crate::mock::MockFetcher;
use async_trait::async_trait;
use std::sync::Arc;

pub type FetcherHandle = Arc<dyn Fetcher + Send + Sync>;

/// Source of raw bytes for a URL.
///
/// # Examples
///
/// ```
/// use hymnal_fetch::{Fetcher, error::Result};
///
/// async fn index_size(fetcher: &dyn Fetcher) -> Result<usize> {
///     let body = fetcher.fetch("https://hymnary.org/sitemap.xml").await?;
///     Ok(body.len())
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve the full body of `url`.
    ///
    /// Any non-success response status is an error; there are no automatic
    /// retries.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
