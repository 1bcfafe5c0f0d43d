//! Layout parsers for result pages.
//!
//! Both layouts reduce to the same shape: find the results container, keep
//! only the listing rows before the "nearby results" boundary marker (the
//! site backfills out-of-area results past the user's true filtered set),
//! extract `(site id, title, detail URL)` per row, and report how to reach
//! the next page, if any.
//!
//! Row extraction is fallible per row: a row whose id cannot be derived is
//! reported as a `RowError` for the caller to log and skip, never as a
//! page-level failure.

use crate::error::{CrawlError, Result};
use crate::layout::Layout;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Selector for the next-page control in the sectioned layout. The driver
/// clicks it through the fetcher rather than navigating to a URL.
pub const SECTIONED_NEXT_SELECTOR: &str = "button.cl-next-page";

/// One listing row extracted from a result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    /// Site-assigned listing id
    pub site_id: String,
    /// Listing title text
    pub name: String,
    /// Absolute detail-page URL
    pub url: String,
}

/// Row-scope extraction failure. Skipped and logged by the caller; never
/// escalated to a crawl-level error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("result row has no title link")]
    MissingTitleLink,

    #[error("could not derive listing id from detail URL {url}")]
    IdUnrecoverable { url: String },
}

/// How to reach the next result page, if there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAdvance {
    /// Navigate to this URL (legacy layout's next link).
    Visit(String),
    /// Click this control on the current page (sectioned layout).
    Click(&'static str),
    /// No more pages.
    End,
}

/// Everything extracted from one result page.
#[derive(Debug)]
pub struct PageExtraction {
    /// Per-row extraction results, in document order.
    pub rows: Vec<std::result::Result<ListingRow, RowError>>,
    /// How to advance past this page.
    pub advance: PageAdvance,
}

/// Parse a rendered result page under the given layout.
///
/// `page_url` is the URL the page was served from; relative hrefs resolve
/// against it.
///
/// # Errors
/// Returns `CrawlError::Parse` if the results container is missing or the
/// page URL is unusable as a base.
pub fn extract_page(layout: Layout, html: &str, page_url: &str) -> Result<PageExtraction> {
    let base = Url::parse(page_url)
        .map_err(|e| CrawlError::Parse(format!("invalid page URL {page_url}: {e}")))?;
    let document = Html::parse_document(html);

    match layout {
        Layout::Legacy => extract_legacy(&document, &base),
        Layout::Sectioned => extract_sectioned(&document, &base),
    }
}

fn extract_legacy(document: &Html, base: &Url) -> Result<PageExtraction> {
    let container_sel = selector("ul#search-results");
    let container = document
        .select(&container_sel)
        .next()
        .ok_or_else(|| CrawlError::Parse("results container not found".to_string()))?;

    // Rows and the nearby-results boundary, in document order; stop at the
    // boundary when present.
    let walk_sel = selector("li.result-row, h4.ban.nearby");
    let mut rows = Vec::new();
    for node in container.select(&walk_sel) {
        if node.value().name() == "h4" {
            break;
        }
        rows.push(legacy_row(&node, base));
    }

    let next_sel = selector("a.button.next");
    let advance = match document
        .select(&next_sel)
        .next()
        .and_then(|link| link.value().attr("href"))
    {
        Some(href) if !href.is_empty() => PageAdvance::Visit(resolve(base, href)?),
        _ => PageAdvance::End,
    };

    Ok(PageExtraction { rows, advance })
}

fn legacy_row(row: &ElementRef, base: &Url) -> std::result::Result<ListingRow, RowError> {
    let link_sel = selector("a.result-title.hdrlnk");
    let link = row
        .select(&link_sel)
        .next()
        .ok_or(RowError::MissingTitleLink)?;

    let href = link.value().attr("href").ok_or(RowError::MissingTitleLink)?;
    let url = base
        .join(href)
        .map_err(|_| RowError::IdUnrecoverable {
            url: href.to_string(),
        })?
        .to_string();

    let site_id = link
        .value()
        .attr("data-id")
        .ok_or_else(|| RowError::IdUnrecoverable { url: url.clone() })?;

    Ok(ListingRow {
        site_id: site_id.to_string(),
        name: link.text().collect::<String>().trim().to_string(),
        url,
    })
}

fn extract_sectioned(document: &Html, base: &Url) -> Result<PageExtraction> {
    let container_sel = selector("div#search-results-page-1");
    let container = document
        .select(&container_sel)
        .next()
        .ok_or_else(|| CrawlError::Parse("results container not found".to_string()))?;

    let walk_sel = selector("li.cl-search-result, li.nearby-separator");
    let mut rows = Vec::new();
    for node in container.select(&walk_sel) {
        if node.value().classes().any(|c| c == "nearby-separator") {
            break;
        }
        rows.push(sectioned_row(&node, base));
    }

    let next_sel = selector(SECTIONED_NEXT_SELECTOR);
    let advance = match document.select(&next_sel).next() {
        Some(button) if button.value().classes().any(|c| c == "bd-disabled") => PageAdvance::End,
        Some(_) => PageAdvance::Click(SECTIONED_NEXT_SELECTOR),
        None => PageAdvance::End,
    };

    Ok(PageExtraction { rows, advance })
}

fn sectioned_row(row: &ElementRef, base: &Url) -> std::result::Result<ListingRow, RowError> {
    let link_sel = selector("a.titlestring");
    let link = row
        .select(&link_sel)
        .next()
        .ok_or(RowError::MissingTitleLink)?;

    let href = link.value().attr("href").ok_or(RowError::MissingTitleLink)?;
    let url = base
        .join(href)
        .map_err(|_| RowError::IdUnrecoverable {
            url: href.to_string(),
        })?
        .to_string();

    // The sectioned layout carries no id attribute; the trailing numeric
    // segment of the detail URL is the listing id.
    static ID_PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = ID_PATTERN.get_or_init(|| Regex::new(r"/(\d+)\.html$").expect("valid regex"));

    let site_id = pattern
        .captures(&url)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| RowError::IdUnrecoverable { url: url.clone() })?
        .as_str()
        .to_string();

    Ok(ListingRow {
        site_id,
        name: link.text().collect::<String>().trim().to_string(),
        url,
    })
}

fn resolve(base: &Url, href: &str) -> Result<String> {
    base.join(href)
        .map(String::from)
        .map_err(|e| CrawlError::Parse(format!("unresolvable next-page href {href}: {e}")))
}

fn selector(s: &str) -> Selector {
    Selector::parse(s).expect("valid selector")
}
