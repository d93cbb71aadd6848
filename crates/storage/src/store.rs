//! Local filesystem artifact store.
//!
//! Artifacts are accessed with `tokio::fs` for async I/O. Writes go through a
//! temporary file in the same directory which is renamed over the final name
//! once complete.

use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_name;
use std::fs::create_dir_all as sync_create_dir;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;

/// Cache directory holding downloaded and extracted sitemap artifacts.
///
/// All names are relative to the root directory and must be a single plain
/// file name (see [`validate_name`](crate::validate_name)).
///
/// # Examples
///
/// ```no_run
/// use hymnal_storage::ArtifactStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = ArtifactStore::new("/var/cache/hymnal")?;
/// if !store.exists("sitemap.xml").await? {
///     store.write("sitemap.xml", b"<sitemapindex/>").await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}
impl ArtifactStore {
    /// Open (creating if necessary) a cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if the path is not
    /// absolute or exists but is not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            // Use non-async here; it only happens once on startup and it's not
            // worth the hassle of making the constructor async.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the artifact called `name`, whether or not it exists.
    pub fn path(&self, name: impl AsRef<Path>) -> Result<PathBuf> {
        Ok(self.root.join(validate_name(name)?))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Check whether a complete artifact called `name` exists.
    ///
    /// Only regular files count; a directory squatting on the name does not.
    pub async fn exists(&self, name: impl AsRef<Path>) -> Result<bool> {
        let path = self.path(name)?;
        match fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(exn::Exn::from(Self::map_io_error(e, &path))),
        }
    }

    /// Atomically write an artifact, replacing any previous version, and
    /// return its absolute path.
    ///
    /// The data is written and synced to a uniquely-named temporary file in
    /// the cache directory, then renamed over `name`. A crash part-way
    /// through leaves at most a stray temporary file, never a truncated
    /// artifact under `name`.
    pub async fn write(&self, name: impl AsRef<Path>, data: &[u8]) -> Result<PathBuf> {
        let path = self.path(name)?;
        let root = self.root.clone();
        let target = path.clone();
        let bytes = data.len();
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut staging = NamedTempFile::new_in(&root).map_err(|e| Self::map_io_error(e, &root))?;
            staging.write_all(&data).map_err(ErrorKind::Io)?;
            staging.as_file().sync_all().map_err(ErrorKind::Io)?;
            staging.persist(&target).map_err(|e| Self::map_io_error(e.error, &target))?;
            Ok(())
        })
        .await
        .map_err(|e| ErrorKind::Io(std::io::Error::other(e)))??;
        tracing::trace!(path = %path.display(), bytes, "Artifact written");
        Ok(path)
    }

    /// Delete an artifact.
    ///
    /// Returns [`NotFound`](ErrorKind::NotFound) if the artifact does not
    /// exist.
    pub async fn remove(&self, name: impl AsRef<Path>) -> Result<()> {
        let path = self.path(name)?;
        Ok(fs::remove_file(&path).await.map_err(|e| Self::map_io_error(e, &path))?)
    }
}
