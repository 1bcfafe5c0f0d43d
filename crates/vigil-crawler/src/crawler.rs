//! Per-search pagination driver.
//!
//! Walks every result page of one saved search, classifying rows as it
//! goes. Termination is layout-driven: the legacy layout ends when the next
//! link is absent or empty, the sectioned layout when the next control is
//! absent or disabled. There is no hard page ceiling by default — result
//! depth is unknown — so the cancellation checkpoint at the top of the page
//! loop is the guard against a site that never stops paginating.

use crate::classifier;
use crate::error::Result;
use crate::layout::Layout;
use crate::parser::{self, PageAdvance};
use sqlx::{Pool, Sqlite};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use vigil_browser::PageFetcher;
use vigil_db::Listing;

/// Crawl one saved search from its canonical URL.
///
/// Returns the listings newly discovered during this crawl, in the order
/// the site presented them. Observing a cancellation request returns the
/// accumulated partial result without error.
///
/// # Errors
/// Any navigation or page-parse failure surfaces as a search-scope error;
/// the driver does not retry.
pub async fn crawl_search<F: PageFetcher + ?Sized>(
    fetcher: &F,
    pool: &Pool<Sqlite>,
    search_url: &str,
    cancel: &CancellationToken,
    settle_delay: Duration,
    max_pages: Option<u32>,
) -> Result<Vec<Listing>> {
    fetcher.goto(search_url).await?;
    // Let dynamically inserted results settle before the first extraction
    tokio::time::sleep(settle_delay).await;

    let mut new_listings = Vec::new();
    let mut pages_crawled: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            tracing::info!(
                "Cancellation observed after {} page(s) of {}, stopping early",
                pages_crawled,
                search_url
            );
            return Ok(new_listings);
        }

        if let Some(ceiling) = max_pages {
            if pages_crawled >= ceiling {
                tracing::warn!("Page ceiling {} reached for {}", ceiling, search_url);
                return Ok(new_listings);
            }
        }

        let page_url = fetcher.current_url().await?;
        let layout = Layout::detect(&page_url);
        tracing::info!("Searching {} using {:?} layout", page_url, layout);

        let html = fetcher.content().await?;
        let extraction = parser::extract_page(layout, &html, &page_url)?;

        for row in extraction.rows {
            match row {
                Ok(row) => {
                    if let Some(listing) =
                        classifier::classify_and_upsert(pool, &row, search_url).await?
                    {
                        new_listings.push(listing);
                    }
                }
                Err(e) => {
                    tracing::error!("Skipping result row on {}: {}", page_url, e);
                }
            }
        }
        pages_crawled += 1;

        match extraction.advance {
            PageAdvance::Visit(next_url) => fetcher.goto(&next_url).await?,
            PageAdvance::Click(selector) => fetcher.click(selector).await?,
            PageAdvance::End => break,
        }
    }

    Ok(new_listings)
}
