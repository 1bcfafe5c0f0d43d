use crate::error::{BrowserError, Result};
use crate::fetcher::PageFetcher;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// A live browser session: the process handle, the single page the crawl
/// drives, and the CDP event pump.
struct Session {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

/// Chromium-backed page fetcher.
///
/// The browser process is launched lazily on first use and reused for the
/// rest of the process lifetime. Image loading and browser logging are
/// suppressed at launch; result pages don't need either.
pub struct ChromeFetcher {
    headless: bool,
    session: Mutex<Option<Session>>,
}

impl ChromeFetcher {
    /// Create a fetcher without launching anything.
    #[must_use]
    pub fn new(headless: bool) -> Self {
        Self {
            headless,
            session: Mutex::new(None),
        }
    }

    async fn launch(&self) -> Result<Session> {
        tracing::info!("Launching browser session");

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--blink-settings=imagesEnabled=false")
            .arg("--disable-logging")
            .arg("--log-level=3");
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // Pump CDP events for the lifetime of the session
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok(Session {
            browser,
            page,
            handler: handler_task,
        })
    }
}

#[async_trait::async_trait]
impl PageFetcher for ChromeFetcher {
    async fn ensure_started(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if session.is_none() {
            *session = Some(self.launch().await?);
        }
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        let session = self.session.lock().await;
        let session = session.as_ref().ok_or(BrowserError::NotStarted)?;

        session
            .page
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;
        session
            .page
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        Ok(())
    }

    async fn content(&self) -> Result<String> {
        let session = self.session.lock().await;
        let session = session.as_ref().ok_or(BrowserError::NotStarted)?;

        session
            .page
            .content()
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))
    }

    async fn current_url(&self) -> Result<String> {
        let session = self.session.lock().await;
        let session = session.as_ref().ok_or(BrowserError::NotStarted)?;

        session
            .page
            .url()
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?
            .ok_or_else(|| BrowserError::Navigation("page has no URL".to_string()))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let session = self.session.lock().await;
        let session = session.as_ref().ok_or(BrowserError::NotStarted)?;

        let element = session
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;
        session
            .page
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        Ok(())
    }

    async fn shutdown(&self) {
        let mut session = self.session.lock().await;
        if let Some(mut session) = session.take() {
            tracing::info!("Closing browser session");
            if let Err(e) = session.browser.close().await {
                tracing::warn!("Browser close failed: {}", e);
            }
            let _ = session.browser.wait().await;
            session.handler.abort();
        }
    }
}
