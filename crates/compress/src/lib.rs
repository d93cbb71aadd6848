//! Decompression of downloaded archives with suffix-based format detection.
//!
//! Sitemap publishers ship their per-category sitemaps as single-member
//! archives (`sitemap_text_1.xml.gz`). This crate wraps the compression
//! libraries behind a unified [`Compression`] enum, providing:
//!
//! - **Format detection** from file names ([`Compression::from_path`]) or
//!   magic bytes ([`Compression::from_magic_bytes`])
//! - **In-memory** compression ([`Compression::compress`]), for building
//!   archives
//! - **Streaming** decompression via wrapped readers
//!   ([`Compression::wrap_reader`], [`Compression::decompress_stream`])
//! - **File extraction** into the decompressed sibling path
//!   ([`extract_file`]), published atomically so that an interrupted
//!   extraction never leaves a truncated file behind.
//!
//! Gzip and Bzip2 are supported.

mod construct;
pub mod error;
mod file;
mod ops;
mod util;

pub use crate::file::{extract_file, extracted_path};

/// A supported compression format.
///
/// Defaults to [`None`](Self::None) (uncompressed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed
    #[default]
    None,
    /// Bzip2 compression (.bz2)
    Bzip2,
    /// Gzip compression (.gz)
    Gzip,
}
