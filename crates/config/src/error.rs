//! Configuration Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration loading.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested configuration file does not exist.
    #[display("configuration file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// A layer could not be read or deserialized.
    #[display("could not load configuration")]
    Load,
    /// One or more fields hold unusable values; every problem is listed.
    #[display("invalid configuration: {}", _0.join("; "))]
    Invalid(#[error(not(source))] Vec<String>),
    /// The working directory needed to resolve a relative path is unavailable.
    #[display("could not resolve path: {}", _0.display())]
    Path(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
