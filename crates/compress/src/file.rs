//! On-disk archive extraction.

use crate::Compression;
use crate::construct::MAGIC_LEN;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::instrument;

/// Path of the decompressed sibling of `source`: the same file name with the
/// compression suffix removed (`sitemap_text_1.xml.gz` becomes
/// `sitemap_text_1.xml`).
///
/// Paths without a recognised compression suffix are returned unchanged.
///
/// ```
/// use hymnal_compress::extracted_path;
/// use std::path::Path;
///
/// assert_eq!(extracted_path("cache/sitemap_text_1.xml.gz"), Path::new("cache/sitemap_text_1.xml"));
/// assert_eq!(extracted_path("cache/sitemap.xml"), Path::new("cache/sitemap.xml"));
/// ```
#[must_use]
pub fn extracted_path(source: impl AsRef<Path>) -> PathBuf {
    let source = source.as_ref();
    match Compression::from_path(source) {
        Compression::None => source.to_path_buf(),
        _ => source.with_extension(""),
    }
}

/// Decompress a single-member archive into its sibling path (see
/// [`extracted_path`]) and return that path.
///
/// The decompressed stream is written to a temporary file in the destination
/// directory and only renamed over the destination once the whole archive has
/// decoded. A corrupt or truncated archive leaves no destination file behind,
/// so the existence of the destination always means a complete extraction.
///
/// # Errors
///
/// Returns [`Extract`](ErrorKind::Extract) naming `source`, raised over the
/// underlying cause:
/// - [`UnsupportedFormat`](ErrorKind::UnsupportedFormat) when the file name
///   carries no compression suffix,
/// - [`InvalidData`](ErrorKind::InvalidData) when the content is not a valid
///   archive of the format its name claims,
/// - [`Io`](ErrorKind::Io) for filesystem failures.
#[instrument(skip(source), fields(source = %source.as_ref().display()))]
pub fn extract_file(source: impl AsRef<Path>) -> Result<PathBuf> {
    let source = source.as_ref();
    extract_file_inner(source).or_raise(|| ErrorKind::Extract(source.to_path_buf()))
}

fn extract_file_inner(source: &Path) -> Result<PathBuf> {
    let format = Compression::from_path(source);
    if format == Compression::None {
        exn::bail!(ErrorKind::UnsupportedFormat(source.display().to_string()));
    }
    let target = extracted_path(source);

    let mut file = File::open(source).or_raise(|| ErrorKind::Io)?;
    let mut magic = Vec::with_capacity(MAGIC_LEN);
    (&mut file).take(MAGIC_LEN as u64).read_to_end(&mut magic).or_raise(|| ErrorKind::Io)?;
    if !format.check_magic_bytes(&magic) {
        tracing::debug!(format = %format, "Archive does not start with the expected magic bytes");
        exn::bail!(ErrorKind::InvalidData);
    }
    file.seek(SeekFrom::Start(0)).or_raise(|| ErrorKind::Io)?;

    let directory = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staging = NamedTempFile::new_in(directory).or_raise(|| ErrorKind::Io)?;
    let bytes = format.decompress_stream(BufReader::new(file), staging.as_file_mut())?;
    staging.as_file().sync_all().or_raise(|| ErrorKind::Io)?;
    staging.persist(&target).or_raise(|| ErrorKind::Io)?;
    tracing::debug!(destination = %target.display(), bytes, "Extracted archive");
    Ok(target)
}
