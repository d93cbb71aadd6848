//! Layered configuration.
//!
//! Values are resolved from, in increasing priority:
//!
//! 1. built-in defaults,
//! 2. a TOML file (an explicit path, otherwise `hymnal.toml` in the platform
//!    configuration directory when it exists),
//! 3. environment variables prefixed with `HYMNAL_` (`HYMNAL_MAX_RESULTS=25`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_INDEX_URL: &str = "https://hymnary.org/sitemap.xml";
pub const DEFAULT_USER_AGENT: &str = concat!("hymnal/", env!("CARGO_PKG_VERSION"));
pub const CONFIG_FILE_NAME: &str = "hymnal.toml";
pub const ENV_PREFIX: &str = "HYMNAL_";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "hymnary", "hymnal")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Absolute URL of the sitemap index.
    pub index_url: String,
    /// File name the sitemap index is cached under.
    pub index_file: String,
    /// Directory holding downloaded and extracted sitemaps. Relative paths
    /// resolve against the working directory.
    pub cache_dir: PathBuf,
    /// Whole-request timeout for every download.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Only child sitemaps whose file name contains this (case-insensitive)
    /// are loaded.
    pub content_marker: String,
    /// Child sitemaps fetched, extracted and parsed at once.
    pub concurrency: usize,
    /// Load at most this many child sitemaps (after the content marker
    /// filter), for a quick partial warm start. Unlimited when unset.
    pub max_sources: Option<usize>,
    /// Default number of search results.
    pub max_results: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            index_file: "sitemap.xml".to_string(),
            cache_dir: project_dirs()
                .map(|dirs| dirs.cache_dir().join("sitemaps"))
                .unwrap_or_else(|| PathBuf::from("sitemaps")),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            content_marker: "text".to_string(),
            concurrency: 4,
            max_sources: None,
            max_results: 10,
        }
    }
}

impl Config {
    /// Load and validate the layered configuration.
    ///
    /// An explicit `path` must exist; the default file location is optional.
    #[instrument(skip(path), fields(path = ?path))]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME)),
        };
        Self::figment(file.as_deref(), Env::prefixed(ENV_PREFIX))
    }

    fn figment(file: Option<&Path>, env: Env) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            tracing::debug!(file = %file.display(), exists = file.is_file(), "Configuration file");
            // Missing files are skipped by the provider.
            figment = figment.merge(Toml::file(file));
        }
        let config: Config = figment.merge(env).extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        match self.index_url.split_once("://") {
            Some(("http" | "https", rest)) if !rest.is_empty() => {},
            _ => errors.push(format!("index_url must be an absolute http(s) URL, got `{}`", self.index_url)),
        }
        let index_file = Path::new(&self.index_file);
        if self.index_file.is_empty() || index_file.components().count() != 1 || index_file.file_name().is_none() {
            errors.push(format!("index_file must be a plain file name, got `{}`", self.index_file));
        }
        if self.cache_dir.as_os_str().is_empty() {
            errors.push("cache_dir must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            errors.push("timeout_secs must be positive".to_string());
        }
        if self.user_agent.trim().is_empty() {
            errors.push("user_agent must not be empty".to_string());
        }
        if self.content_marker.trim().is_empty() {
            errors.push("content_marker must not be empty".to_string());
        }
        if self.concurrency == 0 {
            errors.push("concurrency must be positive".to_string());
        }
        if self.max_sources == Some(0) {
            errors.push("max_sources must be positive when set".to_string());
        }
        if self.max_results == 0 {
            errors.push("max_results must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            exn::bail!(ErrorKind::Invalid(errors))
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The cache directory as an absolute path.
    pub fn cache_root(&self) -> Result<PathBuf> {
        std::path::absolute(&self.cache_dir).or_raise(|| ErrorKind::Path(self.cache_dir.clone()))
    }
}
