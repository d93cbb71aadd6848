//! Sitemap protocol parsing.
//!
//! Only elements bound to the sitemap namespace
//! (`http://www.sitemaps.org/schemas/sitemap/0.9`) are recognised. A document
//! that omits the namespace, or declares a different one, is well-formed but
//! contains no entries.

pub mod error;
mod walk;

use crate::error::{ErrorKind, Result};
use crate::walk::{Container, collect_locs};
use exn::ResultExt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::instrument;

/// The sitemap protocol namespace.
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Child sitemap URLs listed by a sitemap index (`sitemapindex/sitemap/loc`),
/// in document order.
///
/// ```
/// let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <sitemap><loc>https://hymnary.org/sitemap_text_1.xml.gz</loc></sitemap>
/// </sitemapindex>"#;
/// let children = hymnal_sitemap::read_index(xml.as_bytes()).unwrap();
/// assert_eq!(children, ["https://hymnary.org/sitemap_text_1.xml.gz"]);
/// ```
pub fn read_index(reader: impl BufRead) -> Result<Vec<String>> {
    collect_locs(reader, Container::Sitemap)
}

/// Page URLs listed by a url-set sitemap (`urlset/url/loc`), in document
/// order.
pub fn read_urlset(reader: impl BufRead) -> Result<Vec<String>> {
    collect_locs(reader, Container::Url)
}

/// [`read_index`] over a file on disk.
#[instrument(skip(path), fields(path = %path.as_ref().display(), entries))]
pub fn parse_index(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let entries = read_index(open(path.as_ref())?)?;
    tracing::Span::current().record("entries", entries.len());
    Ok(entries)
}

/// [`read_urlset`] over a file on disk.
#[instrument(skip(path), fields(path = %path.as_ref().display(), entries))]
pub fn parse_urlset(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let entries = read_urlset(open(path.as_ref())?)?;
    tracing::Span::current().record("entries", entries.len());
    Ok(entries)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path).or_raise(|| ErrorKind::Io)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const INDEX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap>
    <loc>https://hymnary.org/sitemap_text_1.xml.gz</loc>
    <lastmod>2024-01-01</lastmod>
  </sitemap>
  <sitemap><loc>https://hymnary.org/sitemap_person_1.xml.gz</loc></sitemap>
</sitemapindex>"#;

    const URLSET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://hymnary.org/text/amazing_grace_how_sweet_the_sound</loc></url>
  <url><loc>https://hymnary.org/text/how_great_thou_art</loc><priority>0.5</priority></url>
</urlset>"#;

    #[test]
    fn test_parse_index_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sitemap.xml");
        std::fs::write(&path, INDEX).unwrap();
        assert_eq!(
            parse_index(&path).unwrap(),
            [
                "https://hymnary.org/sitemap_text_1.xml.gz",
                "https://hymnary.org/sitemap_person_1.xml.gz",
            ]
        );
    }

    #[test]
    fn test_parse_urlset_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sitemap_text_1.xml");
        std::fs::write(&path, URLSET).unwrap();
        assert_eq!(
            parse_urlset(&path).unwrap(),
            [
                "https://hymnary.org/text/amazing_grace_how_sweet_the_sound",
                "https://hymnary.org/text/how_great_thou_art",
            ]
        );
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_urlset(PathBuf::from("/nonexistent/sitemap.xml")).unwrap_err();
        assert_eq!(*err, ErrorKind::Io);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_each_parser_ignores_the_other_document_kind() {
        assert!(read_index(URLSET.as_bytes()).unwrap().is_empty());
        assert!(read_urlset(INDEX.as_bytes()).unwrap().is_empty());
    }
}
