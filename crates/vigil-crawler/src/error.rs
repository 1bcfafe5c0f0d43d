use thiserror::Error;

/// Errors raised while crawling a single saved search.
///
/// `Setup` is cycle-fatal; everything else is scoped to the search that
/// raised it and never aborts the remaining searches.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("fetcher setup failed: {0}")]
    Setup(String),

    #[error("page fetch failed: {0}")]
    Fetch(#[from] vigil_browser::BrowserError),

    #[error("page parse failed: {0}")]
    Parse(String),

    #[error("store error: {0}")]
    Database(#[from] vigil_db::DatabaseError),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
