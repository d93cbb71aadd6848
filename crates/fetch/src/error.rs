//! Fetch Error Types

use derive_more::{Display, Error};

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTTP client could not be constructed.
    #[display("could not build HTTP client")]
    Client,
    /// No complete response arrived within the configured timeout.
    #[display("request timed out: {_0}")]
    Timeout(#[error(not(source))] String),
    /// Connection, DNS or protocol failure before a response status arrived.
    #[display("request failed: {_0}")]
    Request(#[error(not(source))] String),
    /// The server answered with a non-success status.
    #[display("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
    /// The connection dropped while reading the response body.
    #[display("could not read response body: {_0}")]
    Body(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Request(_) | Self::Body(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Client => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let kind = ErrorKind::Status {
            url: "https://hymnary.org/sitemap.xml".to_string(),
            status: 404,
        };
        assert_eq!(kind.to_string(), "unexpected status 404 for https://hymnary.org/sitemap.xml");
    }

    #[test]
    fn test_is_retryable() {
        let status = |status| ErrorKind::Status {
            url: String::new(),
            status,
        };
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(ErrorKind::Timeout(String::new()).is_retryable());
        assert!(!ErrorKind::Client.is_retryable());
    }
}
