//! The shared, reloadable hymn catalog.

use crate::artifact::{Artifacts, artifact_name};
use crate::error::{Error, ErrorKind, Result};
use crate::query;
use crate::record::HymnRecord;
use exn::ResultExt;
use futures::{StreamExt, stream};
use hymnal_config::Config;
use hymnal_fetch::{FetcherHandle, HttpFetcher};
use hymnal_storage::ArtifactStore;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

/// An immutable view of every record in the catalog at one point in time.
pub type Snapshot = Arc<[HymnRecord]>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogOptions {
    pub index_url: String,
    /// Cache file name for the sitemap index.
    pub index_file: String,
    /// Child sitemaps are only loaded if their file name contains this.
    pub content_marker: String,
    pub concurrency: usize,
    /// Stop after this many child sitemaps (after marker filtering).
    pub max_sources: Option<usize>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for CatalogOptions {
    fn from(config: &Config) -> Self {
        Self {
            index_url: config.index_url.clone(),
            index_file: config.index_file.clone(),
            content_marker: config.content_marker.clone(),
            concurrency: config.concurrency,
            max_sources: config.max_sources,
        }
    }
}

/// A child sitemap that was skipped during a load.
#[derive(Debug)]
pub struct SourceFailure {
    pub url: String,
    pub error: Error,
}

/// Outcome of a full catalog build.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Records published.
    pub records: usize,
    /// Child sitemaps that loaded successfully.
    pub sources: usize,
    /// Child sitemaps that were skipped, in index order.
    pub failures: Vec<SourceFailure>,
}

/// Handle to the in-memory hymn catalog.
///
/// The catalog is built on first use and published as a single [`Snapshot`];
/// reloads build a new record set on the side and swap it in, so searches
/// never observe a half-built catalog and never wait for a reload.
pub struct Catalog {
    artifacts: Artifacts,
    options: CatalogOptions,
    /// Held for the whole of a load; also memoizes the selected child
    /// sitemap URLs from the last index read.
    children: Mutex<Option<Arc<[String]>>>,
    records: RwLock<Snapshot>,
}

impl Catalog {
    pub fn new(fetcher: FetcherHandle, store: ArtifactStore, options: CatalogOptions) -> Self {
        Self {
            artifacts: Artifacts::new(fetcher, store),
            options,
            children: Mutex::new(None),
            records: RwLock::new(Arc::from(Vec::new())),
        }
    }

    /// Build a catalog that downloads over HTTP into the configured cache
    /// directory.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.timeout(), &config.user_agent)
            .or_raise(|| ErrorKind::Transport(config.index_url.clone()))?;
        let root = config.cache_root().or_raise(|| ErrorKind::Storage)?;
        let store = ArtifactStore::new(root).or_raise(|| ErrorKind::Storage)?;
        Ok(Self::new(Arc::new(fetcher), store, CatalogOptions::from(config)))
    }

    /// The current records, possibly empty if nothing has been loaded yet.
    pub async fn snapshot(&self) -> Snapshot {
        self.records.read().await.clone()
    }

    /// Build the catalog if it is empty (or unconditionally with
    /// `force_reload`) and return the published snapshot.
    ///
    /// # Errors
    ///
    /// [`CatalogUnavailable`](ErrorKind::CatalogUnavailable) when the sitemap
    /// index cannot be obtained or parsed. Failing child sitemaps are logged
    /// and skipped.
    pub async fn load_all(&self, force_reload: bool) -> Result<Snapshot> {
        let (snapshot, _) = self.load(force_reload).await?;
        Ok(snapshot)
    }

    /// Rebuild the catalog and report what was loaded and what was skipped.
    pub async fn refresh(&self) -> Result<LoadReport> {
        let (_, report) = self.load(true).await?;
        Ok(report.unwrap_or_default())
    }

    /// Make sure the catalog is built and return its record count.
    pub async fn ensure_loaded(&self) -> Result<usize> {
        Ok(self.load_all(false).await?.len())
    }

    /// The first `max_results` records matching `query`, in catalog order.
    ///
    /// Searching an empty catalog builds it first; that build failing is the
    /// only error.
    #[instrument(skip(self), fields(results))]
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<HymnRecord>> {
        let mut snapshot = self.snapshot().await;
        if snapshot.is_empty() {
            snapshot = self.load_all(false).await?;
        }
        let found = query::search(&snapshot, query, max_results);
        tracing::Span::current().record("results", found.len());
        Ok(found)
    }

    async fn load(&self, force_reload: bool) -> Result<(Snapshot, Option<LoadReport>)> {
        let mut children = self.children.lock().await;
        if !force_reload {
            // Another caller may have finished a load while this one waited.
            let current = self.snapshot().await;
            if !current.is_empty() {
                return Ok((current, None));
            }
        }
        let memoized = if force_reload { None } else { children.clone() };
        let selected = match memoized {
            Some(selected) => selected,
            None => {
                let selected = self.read_index().await.or_raise(|| ErrorKind::CatalogUnavailable)?;
                *children = Some(selected.clone());
                selected
            },
        };

        let (records, report) = self.build(&selected).await;
        let snapshot: Snapshot = Arc::from(records);
        *self.records.write().await = snapshot.clone();
        tracing::info!(
            records = report.records,
            sources = report.sources,
            failures = report.failures.len(),
            "Catalog published"
        );
        Ok((snapshot, Some(report)))
    }

    /// Resolve and parse the sitemap index, keeping only children whose name
    /// carries the content marker, up to `max_sources` of them.
    #[instrument(skip(self), fields(index_url = %self.options.index_url))]
    async fn read_index(&self) -> Result<Arc<[String]>> {
        let index_url = &self.options.index_url;
        let artifact = self.artifacts.resolve_as(index_url, &self.options.index_file).await?;
        let path = artifact.path.clone();
        let parsed = tokio::task::spawn_blocking(move || hymnal_sitemap::parse_index(path))
            .await
            .map_err(|join| exn::Exn::from(join).raise(ErrorKind::Parse(index_url.clone())))?;
        let children = match parsed {
            Ok(children) => children,
            Err(err) => {
                // A cached index that cannot be parsed would fail every load.
                self.discard_index().await;
                return Err(err).or_raise(|| ErrorKind::Parse(index_url.clone()));
            },
        };

        let marker = self.options.content_marker.to_lowercase();
        let total = children.len();
        let selected: Vec<String> = children
            .into_iter()
            .filter(|url| match artifact_name(url) {
                Ok(name) => name.to_lowercase().contains(&marker),
                // Kept so the failure shows up in the load report.
                Err(_) => true,
            })
            .take(self.options.max_sources.unwrap_or(usize::MAX))
            .collect();
        tracing::info!(origin = %artifact.origin, total, selected = selected.len(), "Read sitemap index");
        Ok(Arc::from(selected))
    }

    async fn discard_index(&self) {
        let name = &self.options.index_file;
        if let Err(err) = self.artifacts.store().remove(name).await {
            tracing::debug!(name = %name, error = ?err, "Could not remove cached sitemap index");
        }
    }

    /// Load every child concurrently, keeping index order in the result.
    async fn build(&self, children: &[String]) -> (Vec<HymnRecord>, LoadReport) {
        let outcomes: Vec<(String, Result<Vec<HymnRecord>>)> = stream::iter(children.iter().cloned())
            .map(|url| async move {
                let outcome = self.load_source(&url).await;
                (url, outcome)
            })
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        let mut records = Vec::new();
        let mut report = LoadReport::default();
        for (url, outcome) in outcomes {
            match outcome {
                Ok(mut loaded) => {
                    report.sources += 1;
                    records.append(&mut loaded);
                },
                Err(error) => {
                    tracing::warn!(url = %url, error = ?error, "Skipping sitemap");
                    report.failures.push(SourceFailure { url, error });
                },
            }
        }
        report.records = records.len();
        (records, report)
    }

    #[instrument(skip(self), fields(records))]
    async fn load_source(&self, url: &str) -> Result<Vec<HymnRecord>> {
        let artifact = self.artifacts.resolve(url).await?;
        let path = artifact.path.clone();
        let parsed = tokio::task::spawn_blocking(move || hymnal_sitemap::parse_urlset(path))
            .await
            .map_err(|join| exn::Exn::from(join).raise(ErrorKind::Parse(url.to_string())))?;
        let pages = match parsed {
            Ok(pages) => pages,
            Err(err) => {
                self.artifacts.evict(url).await.ok();
                return Err(err).or_raise(|| ErrorKind::Parse(url.to_string()));
            },
        };
        let records: Vec<HymnRecord> = pages.into_iter().map(HymnRecord::from_url).collect();
        tracing::Span::current().record("records", records.len());
        tracing::debug!(origin = %artifact.origin, "Loaded sitemap");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hymnal_compress::Compression;
    use hymnal_fetch::MockFetcher;
    use std::path::Path;

    const INDEX_URL: &str = "https://hymnary.org/sitemap.xml";
    const TEXT_1: &str = "https://hymnary.org/sitemap_text_1.xml.gz";
    const TEXT_2: &str = "https://hymnary.org/sitemap_text_2.xml.gz";
    const TEXT_3: &str = "https://hymnary.org/sitemap_TEXT_3.xml.gz";
    const PERSON: &str = "https://hymnary.org/sitemap_person_1.xml.gz";

    fn index(children: &[&str]) -> Vec<u8> {
        let entries: String = children.iter().map(|url| format!("<sitemap><loc>{url}</loc></sitemap>")).collect();
        format!(r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</sitemapindex>"#)
            .into_bytes()
    }

    fn urlset(slugs: &[&str]) -> Vec<u8> {
        let entries: String = slugs
            .iter()
            .map(|slug| format!("<url><loc>https://hymnary.org/text/{slug}</loc></url>"))
            .collect();
        let xml = format!(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</urlset>"#);
        Compression::Gzip.compress(xml.as_bytes()).unwrap()
    }

    /// Five text records across two child sitemaps, plus a non-text sitemap
    /// that must never be requested.
    fn hymnary() -> Arc<MockFetcher> {
        Arc::new(MockFetcher::with_responses([
            (INDEX_URL, index(&[TEXT_1, PERSON, TEXT_2])),
            (
                TEXT_1,
                urlset(&["amazing_grace_how_sweet_the_sound", "how_great_thou_art", "grace_greater_than_our_sin"]),
            ),
            (TEXT_2, urlset(&["be_thou_my_vision", "holy_holy_holy"])),
        ]))
    }

    fn catalog(fetcher: &Arc<MockFetcher>, dir: &Path) -> Catalog {
        let handle: FetcherHandle = fetcher.clone();
        let options = CatalogOptions {
            index_url: INDEX_URL.to_string(),
            concurrency: 2,
            ..CatalogOptions::default()
        };
        Catalog::new(handle, ArtifactStore::new(dir).unwrap(), options)
    }

    fn titles(records: &[HymnRecord]) -> Vec<&str> {
        records.iter().map(HymnRecord::title).collect()
    }

    #[tokio::test]
    async fn test_load_and_search() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        let catalog = catalog(&fetcher, temp_dir.path());

        assert_eq!(catalog.ensure_loaded().await.unwrap(), 5);
        assert_eq!(
            titles(&catalog.snapshot().await),
            [
                "Amazing Grace How Sweet The Sound",
                "How Great Thou Art",
                "Grace Greater Than Our Sin",
                "Be Thou My Vision",
                "Holy Holy Holy",
            ]
        );

        let found = catalog.search("grace", 10).await.unwrap();
        assert_eq!(titles(&found), ["Amazing Grace How Sweet The Sound", "Grace Greater Than Our Sin"]);
        assert_eq!(found[0].url(), "https://hymnary.org/text/amazing_grace_how_sweet_the_sound");
        assert!(catalog.search("xyz_not_found", 10).await.unwrap().is_empty());
        assert_eq!(catalog.search("GRACE", 1).await.unwrap().len(), 1);
        assert_eq!(catalog.search("", 10).await.unwrap().len(), 5);
        let first_two = catalog.search("  ", 2).await.unwrap();
        assert_eq!(titles(&first_two), ["Amazing Grace How Sweet The Sound", "How Great Thou Art"]);
    }

    #[tokio::test]
    async fn test_non_text_sitemaps_are_never_fetched() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        let catalog = catalog(&fetcher, temp_dir.path());

        let report = catalog.refresh().await.unwrap();
        assert_eq!(report.sources, 2);
        assert!(report.failures.is_empty());
        assert_eq!(fetcher.calls_for(PERSON), 0);
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn test_max_sources_limits_child_sitemaps() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        fetcher.insert(INDEX_URL, index(&[PERSON, TEXT_1, TEXT_2]));
        let options = CatalogOptions {
            index_url: INDEX_URL.to_string(),
            max_sources: Some(1),
            ..CatalogOptions::default()
        };
        let catalog = Catalog::new(fetcher.clone(), ArtifactStore::new(temp_dir.path()).unwrap(), options);

        let report = catalog.refresh().await.unwrap();
        assert_eq!(report.sources, 1);
        assert_eq!(report.records, 3);
        // The skipped non-text sitemap does not count towards the limit.
        assert_eq!(fetcher.calls_for(TEXT_1), 1);
        assert_eq!(fetcher.calls_for(PERSON), 0);
        assert_eq!(fetcher.calls_for(TEXT_2), 0);
    }

    #[tokio::test]
    async fn test_content_marker_is_case_insensitive() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::with_responses([
            (INDEX_URL, index(&[TEXT_3])),
            (TEXT_3, urlset(&["abide_with_me"])),
        ]));
        let catalog = catalog(&fetcher, temp_dir.path());
        assert_eq!(catalog.ensure_loaded().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_loads_on_first_use() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        let catalog = catalog(&fetcher, temp_dir.path());
        assert!(catalog.snapshot().await.is_empty());

        let first = catalog.search("how great", 10).await.unwrap();
        let second = catalog.search("how great", 10).await.unwrap();
        assert_eq!(titles(&first), ["How Great Thou Art"]);
        assert_eq!(first, second);
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn test_second_load_makes_no_requests() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        let catalog = catalog(&fetcher, temp_dir.path());

        let first = catalog.load_all(false).await.unwrap();
        let calls = fetcher.calls();
        let second = catalog.load_all(false).await.unwrap();
        assert_eq!(fetcher.calls(), calls);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_concurrent_first_searches_load_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        let catalog = catalog(&fetcher, temp_dir.path());

        let (first, second) = tokio::join!(catalog.search("holy", 10), catalog.search("vision", 10));
        assert_eq!(titles(&first.unwrap()), ["Holy Holy Holy"]);
        assert_eq!(titles(&second.unwrap()), ["Be Thou My Vision"]);
        assert_eq!(fetcher.calls_for(INDEX_URL), 1);
        assert_eq!(fetcher.calls_for(TEXT_1), 1);
    }

    #[tokio::test]
    async fn test_cold_start_uses_cache_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let warm = hymnary();
        catalog(&warm, temp_dir.path()).ensure_loaded().await.unwrap();

        // A new process with no network at all.
        let offline = Arc::new(MockFetcher::default());
        let restarted = catalog(&offline, temp_dir.path());
        assert_eq!(restarted.ensure_loaded().await.unwrap(), 5);
        assert_eq!(offline.calls(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_child_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        fetcher.insert(INDEX_URL, index(&[TEXT_1, TEXT_3, TEXT_2]));
        fetcher.insert(TEXT_3, b"<html>Service Unavailable</html>".to_vec());
        let catalog = catalog(&fetcher, temp_dir.path());

        let report = catalog.refresh().await.unwrap();
        assert_eq!(report.records, 5);
        assert_eq!(report.sources, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].url, TEXT_3);
        assert_eq!(*report.failures[0].error, ErrorKind::Extraction(TEXT_3.to_string()));
        assert_eq!(catalog.snapshot().await.len(), 5);
    }

    #[tokio::test]
    async fn test_corrupt_child_is_downloaded_again() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        fetcher.insert(TEXT_2, b"truncated".to_vec());
        let catalog = catalog(&fetcher, temp_dir.path());
        assert_eq!(catalog.ensure_loaded().await.unwrap(), 3);
        assert!(!temp_dir.path().join("sitemap_text_2.xml.gz").exists());

        fetcher.insert(TEXT_2, urlset(&["be_thou_my_vision", "holy_holy_holy"]));
        let report = catalog.refresh().await.unwrap();
        assert!(report.failures.is_empty());
        assert_eq!(report.records, 5);
        assert_eq!(fetcher.calls_for(TEXT_2), 2);
        assert_eq!(fetcher.calls_for(TEXT_1), 1);
    }

    #[tokio::test]
    async fn test_missing_child_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        fetcher.insert(INDEX_URL, index(&[TEXT_1, "https://hymnary.org/sitemap_text_9.xml.gz"]));
        let catalog = catalog(&fetcher, temp_dir.path());

        let report = catalog.refresh().await.unwrap();
        assert_eq!(report.records, 3);
        assert_eq!(
            *report.failures[0].error,
            ErrorKind::Transport("https://hymnary.org/sitemap_text_9.xml.gz".to_string())
        );
    }

    #[tokio::test]
    async fn test_malformed_child_is_skipped_and_evicted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        let broken = Compression::Gzip.compress(b"<urlset><url>").unwrap();
        fetcher.insert(TEXT_2, broken);
        let catalog = catalog(&fetcher, temp_dir.path());

        let report = catalog.refresh().await.unwrap();
        assert_eq!(report.records, 3);
        assert_eq!(*report.failures[0].error, ErrorKind::Parse(TEXT_2.to_string()));
        assert!(!temp_dir.path().join("sitemap_text_2.xml").exists());
        assert!(!temp_dir.path().join("sitemap_text_2.xml.gz").exists());
    }

    #[tokio::test]
    async fn test_unreachable_index() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::default());
        let catalog = catalog(&fetcher, temp_dir.path());

        let err = catalog.load_all(false).await.unwrap_err();
        assert_eq!(*err, ErrorKind::CatalogUnavailable);
        let err = catalog.search("grace", 10).await.unwrap_err();
        assert_eq!(*err, ErrorKind::CatalogUnavailable);
    }

    #[tokio::test]
    async fn test_malformed_index_is_discarded() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        fetcher.insert(INDEX_URL, b"<sitemapindex".to_vec());
        let catalog = catalog(&fetcher, temp_dir.path());

        let err = catalog.ensure_loaded().await.unwrap_err();
        assert_eq!(*err, ErrorKind::CatalogUnavailable);
        assert!(!temp_dir.path().join("sitemap.xml").exists());

        fetcher.insert(INDEX_URL, index(&[TEXT_1, TEXT_2]));
        assert_eq!(catalog.ensure_loaded().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_published_catalog() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        let catalog = catalog(&fetcher, temp_dir.path());
        let loaded = catalog.load_all(false).await.unwrap();

        std::fs::remove_file(temp_dir.path().join("sitemap.xml")).unwrap();
        fetcher.insert(INDEX_URL, b"not xml".to_vec());
        assert!(catalog.refresh().await.is_err());
        assert!(Arc::ptr_eq(&loaded, &catalog.snapshot().await));
    }

    #[tokio::test]
    async fn test_forced_reload_rereads_index() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        let catalog = catalog(&fetcher, temp_dir.path());
        catalog.ensure_loaded().await.unwrap();

        // Only the cached index file on disk changes; a forced reload sees it.
        std::fs::write(temp_dir.path().join("sitemap.xml"), index(&[TEXT_2])).unwrap();
        let snapshot = catalog.load_all(true).await.unwrap();
        assert_eq!(titles(&snapshot), ["Be Thou My Vision", "Holy Holy Holy"]);
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_index_publishes_empty_catalog() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::with_responses([(INDEX_URL, index(&[]))]));
        let catalog = catalog(&fetcher, temp_dir.path());

        let report = catalog.refresh().await.unwrap();
        assert_eq!(report.records, 0);
        assert!(catalog.search("grace", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_titles_are_kept() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fetcher = hymnary();
        fetcher.insert(TEXT_2, urlset(&["how_great_thou_art"]));
        let catalog = catalog(&fetcher, temp_dir.path());

        let found = catalog.search("how great thou art", 10).await.unwrap();
        assert_eq!(found.len(), 2);
    }
}
