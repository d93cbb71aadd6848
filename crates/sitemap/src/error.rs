//! Sitemap Error Types

use derive_more::{Display, Error};

/// A sitemap parsing error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for sitemap parsing.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document could not be opened or read.
    #[display("could not read sitemap")]
    Io,
    /// The document is not well-formed XML.
    #[display("malformed sitemap XML")]
    Malformed,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}
