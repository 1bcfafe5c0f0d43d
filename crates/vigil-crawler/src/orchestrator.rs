//! Poll-cycle orchestration.
//!
//! The `AcquisitionEngine` runs one full poll cycle: ensure the page
//! fetcher is up, purge stale listings, then crawl every saved search in
//! store order, isolating per-search failures and folding everything into
//! a single `PollCycleResult` for the caller's notification layer.

use crate::crawler;
use crate::error::CrawlError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use vigil_browser::PageFetcher;
use vigil_db::{listings, searches, Database, Listing};

/// Days a listing may go unseen before the retention sweep removes it.
const RETENTION_DAYS: i64 = 7;

/// Outcome of crawling one saved search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// The search was crawled to completion.
    Ok,
    /// The search failed mid-crawl; other searches were unaffected.
    Failed,
}

/// Overall outcome of a poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleOutcome {
    /// Setup succeeded and every attempted search completed.
    #[default]
    Ok,
    /// Setup failed, or at least one search failed.
    Failed,
}

/// Aggregate result of one poll cycle.
///
/// This is everything the notification layer needs: newly discovered
/// listings keyed by saved-search id, and per-search status keyed by
/// canonical search URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollCycleResult {
    /// Newly discovered listings per saved-search id. Searches that found
    /// nothing new are absent.
    pub new_listings: HashMap<i64, Vec<Listing>>,
    /// Per-search outcome, keyed by canonical search URL. Skipped (blank)
    /// searches are absent.
    pub search_outcomes: HashMap<String, SearchOutcome>,
    /// Overall cycle outcome.
    pub outcome: CycleOutcome,
}

impl PollCycleResult {
    /// Total count of newly discovered listings across all searches.
    #[must_use]
    pub fn total_new(&self) -> usize {
        self.new_listings.values().map(Vec::len).sum()
    }
}

/// Runs poll cycles over a page fetcher and the listing store.
///
/// The fetcher is owned by the engine and exclusively driven by the single
/// background task running `run_cycle`; at most one cycle may be in flight
/// at a time (caller-side precondition).
pub struct AcquisitionEngine<F: PageFetcher> {
    fetcher: F,
    db: Arc<Database>,
    cancel: Mutex<CancellationToken>,
    settle_delay: Duration,
    max_pages: Option<u32>,
}

impl<F: PageFetcher> AcquisitionEngine<F> {
    /// Create an engine over the given store and fetcher.
    pub fn new(db: Arc<Database>, fetcher: F) -> Self {
        Self {
            fetcher,
            db,
            cancel: Mutex::new(CancellationToken::new()),
            settle_delay: Duration::from_millis(1000),
            max_pages: None,
        }
    }

    /// Set the pause taken after loading a search's first page.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set an optional safety ceiling on pages crawled per search.
    ///
    /// Off by default: termination is layout-driven.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Request cooperative cancellation of the in-flight cycle.
    ///
    /// The running cycle observes the request before starting each search
    /// and before each page crawl, so it may take up to one page fetch to
    /// take effect. The partial aggregate built so far is returned as
    /// normal output.
    pub fn request_cancel(&self) {
        self.current_token().cancel();
    }

    /// The cancellation token observed by the current (or next) cycle.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.current_token()
    }

    fn current_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .expect("cancellation flag lock poisoned")
            .clone()
    }

    /// Install a fresh token if the previous cycle consumed one.
    fn cycle_token(&self) -> CancellationToken {
        let mut guard = self
            .cancel
            .lock()
            .expect("cancellation flag lock poisoned");
        if guard.is_cancelled() {
            *guard = CancellationToken::new();
        }
        guard.clone()
    }

    /// Run one poll cycle to completion (or until cancellation).
    ///
    /// Never fails from the caller's viewpoint: every failure mode is
    /// folded into the returned aggregate's outcome fields.
    pub async fn run_cycle(&self) -> PollCycleResult {
        let cancel = self.cycle_token();
        let mut result = PollCycleResult::default();

        // Setup is fatal to the whole cycle: no search is attempted
        if let Err(e) = self.fetcher.ensure_started().await {
            let err = CrawlError::Setup(e.to_string());
            tracing::error!("{}", err);
            result.outcome = CycleOutcome::Failed;
            return result;
        }

        // Retention sweep before any fetch
        if let Err(e) = listings::purge_older_than(self.db.pool(), RETENTION_DAYS).await {
            tracing::error!("Retention sweep failed: {}", e);
            result.outcome = CycleOutcome::Failed;
            return result;
        }

        let all_searches = match searches::list_searches(self.db.pool()).await {
            Ok(all) => all,
            Err(e) => {
                tracing::error!("Failed to load saved searches: {}", e);
                result.outcome = CycleOutcome::Failed;
                return result;
            }
        };

        for search in all_searches {
            if cancel.is_cancelled() {
                tracing::info!("Cycle cancelled before search {}, keeping partial results", search.id);
                break;
            }

            // Blank searches produce no network activity and no outcome
            if search.is_blank() {
                tracing::debug!("Skipping saved search {} with blank query", search.id);
                continue;
            }

            let search_url = match search.canonical_url() {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!("Saved search {} has no crawlable URL: {}", search.id, e);
                    result.outcome = CycleOutcome::Failed;
                    continue;
                }
            };

            match crawler::crawl_search(
                &self.fetcher,
                self.db.pool(),
                &search_url,
                &cancel,
                self.settle_delay,
                self.max_pages,
            )
            .await
            {
                Ok(new_listings) => {
                    tracing::info!(
                        "Search {} found {} new listing(s)",
                        search_url,
                        new_listings.len()
                    );
                    if !new_listings.is_empty() {
                        result.new_listings.insert(search.id, new_listings);
                    }
                    result.search_outcomes.insert(search_url, SearchOutcome::Ok);
                }
                Err(e) => {
                    tracing::error!("Failed to update {}: {}", search_url, e);
                    result
                        .search_outcomes
                        .insert(search_url, SearchOutcome::Failed);
                    result.outcome = CycleOutcome::Failed;
                }
            }
        }

        result
    }

    /// Release the page fetcher session. Safe to call once at process exit,
    /// including when no cycle ever ran.
    pub async fn shutdown(&self) {
        self.fetcher.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_window() {
        // The sweep removes listings unseen for a week
        assert_eq!(RETENTION_DAYS, 7);
    }

    #[test]
    fn test_cycle_result_default_is_ok() {
        let result = PollCycleResult::default();
        assert_eq!(result.outcome, CycleOutcome::Ok);
        assert!(result.new_listings.is_empty());
        assert!(result.search_outcomes.is_empty());
        assert_eq!(result.total_new(), 0);
    }
}
