use crate::error::Result;

/// Capability contract for fetching rendered result pages.
///
/// The acquisition engine drives a crawl exclusively through this trait, so
/// tests can substitute a scripted double that serves paged content without
/// a real browser.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Start the underlying session if it is not running yet.
    ///
    /// Idempotent; a live session is reused. A failure here is fatal to the
    /// whole poll cycle.
    async fn ensure_started(&self) -> Result<()>;

    /// Navigate to a URL and wait for the page to load.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Return the rendered content of the current page.
    async fn content(&self) -> Result<String>;

    /// Return the URL of the current page.
    ///
    /// The URL decides which result layout is in effect, so it must reflect
    /// in-page navigation (hash-fragment changes included).
    async fn current_url(&self) -> Result<String>;

    /// Click the element matching `selector` and wait for any resulting
    /// navigation.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Tear down the session.
    ///
    /// Called once at process teardown; must be a no-op against a session
    /// that was never started.
    async fn shutdown(&self);
}
