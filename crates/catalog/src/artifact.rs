//! Cache-first resolution of remote sitemap files.
//!
//! For a remote URL the local cache directory is consulted before the
//! network:
//!
//! 1. the extracted artifact exists: use it;
//! 2. only the compressed artifact exists: extract it;
//! 3. neither exists: download, store, then extract.

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use exn::ResultExt;
use hymnal_compress::{Compression, extracted_path};
use hymnal_fetch::FetcherHandle;
use hymnal_storage::ArtifactStore;
use hymnal_storage::error::ErrorKind as StorageErrorKind;
use std::path::{Path, PathBuf};
use tracing::instrument;
use url::Url;

/// How an artifact was obtained.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Origin {
    /// The extracted file was already on disk.
    #[display("cached")]
    Cached,
    /// The compressed file was on disk and has been extracted.
    #[display("extracted")]
    Extracted,
    /// The file was downloaded (and extracted, if compressed).
    #[display("downloaded")]
    Downloaded,
}

/// A local, ready-to-parse copy of a remote sitemap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub origin: Origin,
}

/// Cache artifact name for a remote URL: its final non-empty path segment.
///
/// ```
/// use hymnal_catalog::artifact_name;
///
/// assert_eq!(artifact_name("https://hymnary.org/sitemap_text_1.xml.gz").unwrap(), "sitemap_text_1.xml.gz");
/// assert!(artifact_name("https://hymnary.org/").is_err());
/// ```
pub fn artifact_name(url: &str) -> Result<String> {
    let invalid = || ErrorKind::InvalidUrl(url.to_string());
    let parsed = Url::parse(url).or_raise(invalid)?;
    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
        .ok_or_else(|| exn::Exn::from(invalid()))?;
    hymnal_storage::validate_name(name).or_raise(invalid)?;
    Ok(name.to_string())
}

/// Resolves remote sitemap URLs to local files, downloading only on a cache
/// miss.
pub struct Artifacts {
    fetcher: FetcherHandle,
    store: ArtifactStore,
}

impl Artifacts {
    pub fn new(fetcher: FetcherHandle, store: ArtifactStore) -> Self {
        Self { fetcher, store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Resolve `url` under the name derived by [`artifact_name`].
    pub async fn resolve(&self, url: &str) -> Result<Artifact> {
        let name = artifact_name(url)?;
        self.resolve_as(url, &name).await
    }

    /// Resolve `url`, caching it under `name`.
    ///
    /// A name with a compression suffix (`.gz`, `.bz2`) is decompressed into
    /// its sibling without the suffix; any other name is stored and used
    /// as-is. A compressed file that fails to extract is deleted so that the
    /// next attempt downloads it again.
    #[instrument(skip(self), fields(origin))]
    pub async fn resolve_as(&self, url: &str, name: &str) -> Result<Artifact> {
        let extracted_name = extracted_path(name);
        let extracted = self.store.path(&extracted_name).or_raise(|| ErrorKind::InvalidUrl(url.to_string()))?;
        if self.store.exists(&extracted_name).await.or_raise(|| ErrorKind::Storage)? {
            tracing::Span::current().record("origin", tracing::field::display(Origin::Cached));
            tracing::debug!(path = %extracted.display(), "Cache hit");
            return Ok(Artifact {
                path: extracted,
                origin: Origin::Cached,
            });
        }

        let compressed = Compression::from_path(name) != Compression::None;
        let origin = if compressed && self.store.exists(name).await.or_raise(|| ErrorKind::Storage)? {
            Origin::Extracted
        } else {
            let body = self.fetcher.fetch(url).await.or_raise(|| ErrorKind::Transport(url.to_string()))?;
            let stored = self.store.write(name, &body).await.or_raise(|| ErrorKind::Storage)?;
            tracing::info!(path = %stored.display(), bytes = body.len(), "Downloaded");
            Origin::Downloaded
        };
        tracing::Span::current().record("origin", tracing::field::display(origin));

        let path = if compressed { self.extract(url, name).await? } else { extracted };
        Ok(Artifact { path, origin })
    }

    async fn extract(&self, url: &str, name: &str) -> Result<PathBuf> {
        let source = self.store.path(name).or_raise(|| ErrorKind::Storage)?;
        let extraction = tokio::task::spawn_blocking(move || hymnal_compress::extract_file(source)).await;
        match extraction {
            Ok(Ok(path)) => Ok(path),
            Ok(Err(err)) => {
                tracing::warn!(url, error = ?err, "Discarding unreadable archive");
                self.discard(name).await;
                Err(err).or_raise(|| ErrorKind::Extraction(url.to_string()))
            },
            Err(join) => Err(exn::Exn::from(join).raise(ErrorKind::Extraction(url.to_string()))),
        }
    }

    /// Drop every cached copy of `url`, so the next resolution downloads it
    /// again.
    pub async fn evict(&self, url: &str) -> Result<()> {
        let name = artifact_name(url)?;
        let extracted_name = extracted_path(&name);
        self.discard(&extracted_name).await;
        if Path::new(&name) != extracted_name {
            self.discard(&name).await;
        }
        Ok(())
    }

    async fn discard(&self, name: impl AsRef<Path>) {
        let name = name.as_ref();
        match self.store.remove(name).await {
            Ok(()) => tracing::debug!(name = %name.display(), "Removed cache artifact"),
            Err(err) if matches!(*err, StorageErrorKind::NotFound(_)) => {},
            Err(err) => tracing::warn!(name = %name.display(), error = ?err, "Could not remove cache artifact"),
        }
    }
}
