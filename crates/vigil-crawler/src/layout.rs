//! Result-page layout detection.
//!
//! The site has served two incompatible result layouts over time. Which one
//! a given page uses is visible in its URL: the newer layout keeps its
//! search state in a hash fragment (`#search=1~gallery~0~0` and similar),
//! the older one does not. Detection is per page, not per search — a crawl
//! can cross from one layout into the other between pages.

use regex::Regex;
use std::sync::OnceLock;

/// The two result-page layouts, selected by a pure predicate over the
/// current page URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Older server-rendered list layout (`ul#search-results`).
    Legacy,
    /// Newer script-rendered layout with the hash-fragment search-state
    /// marker (`div#search-results-page-1`).
    Sectioned,
}

impl Layout {
    /// Detect the layout in effect for a page URL.
    #[must_use]
    pub fn detect(url: &str) -> Self {
        static MARKER: OnceLock<Regex> = OnceLock::new();
        let marker = MARKER
            .get_or_init(|| Regex::new(r"#search=\d+~.+~\d+~\d+$").expect("valid regex"));

        if marker.is_match(url) {
            Self::Sectioned
        } else {
            Self::Legacy
        }
    }
}
