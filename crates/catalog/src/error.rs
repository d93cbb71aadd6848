//! Catalog Error Types
//!
//! Per-source kinds (`Transport`, `Extraction`, `Parse`, `InvalidUrl`) name
//! the remote URL that failed; the underlying cause is kept in the error tree.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The resource could not be downloaded.
    #[display("could not download {_0}")]
    Transport(#[error(not(source))] String),
    /// The downloaded archive could not be decompressed.
    #[display("could not extract {_0}")]
    Extraction(#[error(not(source))] String),
    /// The sitemap is not well-formed XML.
    #[display("could not parse {_0}")]
    Parse(#[error(not(source))] String),
    /// The cache directory could not be read or written.
    #[display("cache directory error")]
    Storage,
    /// No cache artifact name can be derived from the URL.
    #[display("invalid sitemap URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// The sitemap index could not be obtained or parsed, so no catalog can be
    /// built.
    #[display("hymn catalog unavailable")]
    CatalogUnavailable,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Storage | Self::CatalogUnavailable)
    }
}
