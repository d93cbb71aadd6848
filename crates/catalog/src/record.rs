use crate::title::title_from_url;

/// One hymn page in the catalog.
///
/// The URL is the identity; the titles are derived from it once and never
/// change.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HymnRecord {
    url: String,
    title: String,
    normalized_title: String,
}

impl HymnRecord {
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let title = title_from_url(&url);
        let normalized_title = title.to_lowercase();
        Self {
            url,
            title,
            normalized_title,
        }
    }

    /// Absolute page URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Lowercased title used for matching.
    pub fn normalized_title(&self) -> &str {
        &self.normalized_title
    }
}
