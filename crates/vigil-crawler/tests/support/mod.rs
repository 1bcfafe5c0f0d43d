//! Scripted `PageFetcher` double and result-page builders for cycle tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use vigil_browser::{BrowserError, PageFetcher, Result};

/// One scripted page the mock can serve.
#[derive(Default, Clone)]
pub struct MockPage {
    /// Rendered content returned by `content()`.
    pub html: String,
    /// URL reported by `current_url()`; defaults to the page's own key.
    /// Used to simulate the hash-fragment search-state marker.
    pub displayed_url: Option<String>,
    /// Selector that, when clicked, navigates to the given page key.
    pub click_target: Option<(String, String)>,
}

#[derive(Default)]
struct State {
    pages: HashMap<String, MockPage>,
    current: Option<String>,
    goto_count: usize,
    content_count: usize,
    fail_goto: HashSet<String>,
    fail_start: bool,
    started: bool,
    shutdown_count: usize,
    cancel_after_contents: Option<(usize, CancellationToken)>,
}

/// In-memory `PageFetcher` serving scripted paged content.
///
/// Clones share state, so tests keep a handle for assertions while the
/// engine owns another.
#[derive(Clone, Default)]
pub struct MockFetcher {
    state: Arc<Mutex<State>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&self, url: &str, html: String) {
        self.add_page_full(
            url,
            MockPage {
                html,
                ..MockPage::default()
            },
        );
    }

    pub fn add_page_full(&self, url: &str, page: MockPage) {
        self.lock().pages.insert(url.to_string(), page);
    }

    /// Make navigation to `url` fail with a navigation error.
    pub fn fail_goto(&self, url: &str) {
        self.lock().fail_goto.insert(url.to_string());
    }

    /// Make `ensure_started` fail, simulating an unlaunchable browser.
    pub fn fail_start(&self) {
        self.lock().fail_start = true;
    }

    /// Cancel `token` when the n-th `content()` call is served.
    pub fn cancel_after_contents(&self, n: usize, token: CancellationToken) {
        self.lock().cancel_after_contents = Some((n, token));
    }

    pub fn goto_count(&self) -> usize {
        self.lock().goto_count
    }

    pub fn shutdown_count(&self) -> usize {
        self.lock().shutdown_count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("mock state lock poisoned")
    }
}

#[async_trait::async_trait]
impl PageFetcher for MockFetcher {
    async fn ensure_started(&self) -> Result<()> {
        let mut state = self.lock();
        if state.fail_start {
            return Err(BrowserError::Launch("scripted launch failure".to_string()));
        }
        state.started = true;
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.lock();
        if !state.started {
            return Err(BrowserError::NotStarted);
        }
        state.goto_count += 1;
        if state.fail_goto.contains(url) {
            return Err(BrowserError::Navigation(format!(
                "scripted navigation failure for {url}"
            )));
        }
        if !state.pages.contains_key(url) {
            return Err(BrowserError::Navigation(format!("no scripted page at {url}")));
        }
        state.current = Some(url.to_string());
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        let mut state = self.lock();
        let current = state.current.clone().ok_or(BrowserError::NotStarted)?;
        let html = state
            .pages
            .get(&current)
            .map(|page| page.html.clone())
            .ok_or_else(|| BrowserError::Navigation(format!("no scripted page at {current}")))?;

        state.content_count += 1;
        if let Some((n, token)) = &state.cancel_after_contents {
            if state.content_count == *n {
                token.cancel();
            }
        }

        Ok(html)
    }

    async fn current_url(&self) -> Result<String> {
        let state = self.lock();
        let current = state.current.clone().ok_or(BrowserError::NotStarted)?;
        Ok(state
            .pages
            .get(&current)
            .and_then(|page| page.displayed_url.clone())
            .unwrap_or(current))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut state = self.lock();
        let current = state.current.clone().ok_or(BrowserError::NotStarted)?;
        let target = state
            .pages
            .get(&current)
            .and_then(|page| page.click_target.clone());

        match target {
            Some((expected, destination)) if expected == selector => {
                state.current = Some(destination);
                Ok(())
            }
            _ => Err(BrowserError::SelectorNotFound(selector.to_string())),
        }
    }

    async fn shutdown(&self) {
        self.lock().shutdown_count += 1;
    }
}

/// Build a legacy-layout result page.
pub fn legacy_page(rows: &[(&str, &str)], next_href: Option<&str>) -> String {
    let rows_html: String = rows
        .iter()
        .map(|(id, name)| {
            format!(
                r#"<li class="result-row"><a class="result-title hdrlnk" data-id="{id}" href="https://seattle.craigslist.org/see/bik/{id}.html">{name}</a></li>"#
            )
        })
        .collect();
    let next = next_href
        .map(|href| format!(r#"<a class="button next" href="{href}">next</a>"#))
        .unwrap_or_default();

    format!(r#"<html><body><ul id="search-results">{rows_html}</ul>{next}</body></html>"#)
}

/// Next-control state for sectioned-layout pages.
#[derive(Clone, Copy)]
pub enum SectionedNext {
    Enabled,
    Disabled,
    Absent,
}

/// Build a sectioned-layout result page.
pub fn sectioned_page(rows: &[(&str, &str)], next: SectionedNext) -> String {
    let rows_html: String = rows
        .iter()
        .map(|(id, name)| {
            format!(
                r#"<li class="cl-search-result"><a class="titlestring" href="https://seattle.craigslist.org/see/bik/{id}.html">{name}</a></li>"#
            )
        })
        .collect();
    let button = match next {
        SectionedNext::Enabled => r#"<button class="bd-button cl-next-page">next</button>"#,
        SectionedNext::Disabled => {
            r#"<button class="bd-button cl-next-page bd-disabled">next</button>"#
        }
        SectionedNext::Absent => "",
    };

    format!(
        r#"<html><body><div id="search-results-page-1"><ol>{rows_html}</ol></div>{button}</body></html>"#
    )
}
