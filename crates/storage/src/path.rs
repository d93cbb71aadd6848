//! Artifact name validation.
//!
//! The cache directory is flat: every artifact is a single file directly
//! beneath the root. Names usually come straight from the last path segment
//! of a remote URL, so they are treated as untrusted input.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates an artifact name.
///
/// A valid name is exactly one plain path component: no separators, no `.`
/// or `..`, no root or prefix, and no null bytes.
///
/// # Returns
/// Returns the name as a [`PathBuf`] if valid, or
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath) if invalid.
///
/// # Examples
///
/// ```
/// use hymnal_storage::validate_name;
/// // Valid names
/// assert!(validate_name("sitemap.xml").is_ok());
/// assert!(validate_name("sitemap_text_1.xml.gz").is_ok());
/// // Invalid names
/// assert!(validate_name("../sitemap.xml").is_err());
/// assert!(validate_name("nested/sitemap.xml").is_err());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("a\0b").is_err());
/// ```
pub fn validate(name: impl AsRef<Path>) -> Result<PathBuf> {
    let name = name.as_ref();
    let mut components = name.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(s)), None) if !s.as_encoded_bytes().contains(&0) => Ok(PathBuf::from(s)),
        _ => exn::bail!(ErrorKind::InvalidPath(name.to_path_buf())),
    }
}
