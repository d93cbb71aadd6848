//! Hymn lookup over hymnary.org sitemaps.
//!
//! A [`Catalog`] downloads the site's sitemap index, resolves the hymn text
//! sitemaps it lists through a local cache directory, turns every page URL
//! into a [`HymnRecord`] and answers title queries against the result.
//!
//! ```no_run
//! use hymnal_catalog::Catalog;
//! use hymnal_config::Config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::from_config(&Config::default())?;
//! for hymn in catalog.search("amazing grace", 5).await? {
//!     println!("{}\t{}", hymn.title(), hymn.url());
//! }
//! # Ok(())
//! # }
//! ```

mod artifact;
mod catalog;
pub mod error;
mod query;
mod record;
mod title;

pub use crate::artifact::{Artifact, Artifacts, Origin, artifact_name};
pub use crate::catalog::{Catalog, CatalogOptions, LoadReport, Snapshot, SourceFailure};
pub use crate::query::{Query, search};
pub use crate::record::HymnRecord;
pub use crate::title::title_from_url;
