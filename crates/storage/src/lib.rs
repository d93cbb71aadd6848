//! Flat, file-per-artifact cache directory.
//!
//! Every downloaded or extracted sitemap is stored under a single file name in
//! one directory. Writes are atomic, so the presence of a file is proof that
//! it was written completely.

pub mod error;
mod path;
mod store;

pub use crate::path::validate as validate_name;
pub use crate::store::ArtifactStore;
