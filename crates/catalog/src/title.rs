//! Display titles derived from hymnary.org page URLs.

/// Turn a page URL into a display title.
///
/// The final non-empty path segment is used (a trailing slash, query string
/// and fragment are ignored), underscores become spaces, and every
/// whitespace-separated word is title-cased. The segment is taken from the
/// URL text as written: nothing is percent-encoded or decoded, and `..` or
/// `\` get no special meaning. A URL with no path segment is returned
/// unchanged.
///
/// ```
/// use hymnal_catalog::title_from_url;
///
/// assert_eq!(title_from_url("https://hymnary.org/text/how_great_thou_art"), "How Great Thou Art");
/// assert_eq!(title_from_url("https://hymnary.org/text/how_great_thou_art/"), "How Great Thou Art");
/// assert_eq!(title_from_url("https://hymnary.org"), "https://hymnary.org");
/// ```
pub fn title_from_url(url: &str) -> String {
    match last_segment(url) {
        Some(segment) => title_case(&segment.replace('_', " ")),
        None => url.to_string(),
    }
}

fn last_segment(url: &str) -> Option<&str> {
    let url = url.split(['?', '#']).next()?;
    // Skip the scheme and host of an absolute URL.
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map_or("", |(_, path)| path),
        None => url,
    };
    path.split('/').filter(|segment| !segment.is_empty()).next_back()
}

/// Uppercase the first letter of every word and lowercase the rest, keeping
/// the original spacing.
fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            word_start = true;
            titled.push(c);
        } else if word_start {
            word_start = false;
            titled.push(c.to_ascii_uppercase());
        } else {
            titled.push(c.to_ascii_lowercase());
        }
    }
    titled
}
