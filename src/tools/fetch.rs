// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Page fetchers used by the scrape tool.
//!
//! Every fetch builds its own client (or browser) and drops it before
//! returning, whatever the outcome. The HTTP fetcher re-validates each
//! redirect hop against the URL policy.

use crate::config::FetchConfig;
use crate::tools::ToolError;
use crate::validator::{UrlValidator, ValidationResult};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::redirect;
use std::sync::Arc;
use tracing::debug;

const MAX_REDIRECTS: usize = 10;

#[cfg(feature = "browser")]
const RENDER_GRACE: std::time::Duration = std::time::Duration::from_secs(2);

/// Raw page as returned by a fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL after redirects
    pub final_url: String,
    pub html: String,
}

/// Retrieves a page that has already passed URL validation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`, rendering JavaScript first when `render_js` is set and
    /// the fetcher supports it.
    async fn fetch(&self, url: &str, render_js: bool) -> Result<FetchedPage, ToolError>;
}

/// Plain HTTP fetcher.
pub struct HttpFetcher {
    validator: Arc<UrlValidator>,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(validator: Arc<UrlValidator>, config: FetchConfig) -> Self {
        Self { validator, config }
    }

    fn build_client(&self) -> Result<reqwest::Client, ToolError> {
        let validator = self.validator.clone();
        let policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                return attempt.error("too many redirects");
            }
            match validator.validate(attempt.url().as_str()) {
                ValidationResult::Valid => attempt.follow(),
                ValidationResult::Invalid(err) => attempt.error(err),
            }
        });

        reqwest::Client::builder()
            .timeout(self.config.request_timeout())
            .user_agent(self.config.user_agent.as_str())
            .redirect(policy)
            .build()
            .map_err(|e| ToolError::Upstream(format!("client setup failed: {e}")))
    }

    fn content_type_allowed(&self, content_type: &str) -> bool {
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_lowercase();
        self.config
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&media_type))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, render_js: bool) -> Result<FetchedPage, ToolError> {
        if render_js {
            debug!(url = %url, "JavaScript rendering unavailable, fetching raw HTML");
        }

        let timeout = self.config.request_timeout();
        let client = self.build_client()?;

        let mut response = client
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| ToolError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Status {
                status: status.as_u16(),
            });
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !self.content_type_allowed(content_type) {
                return Err(ToolError::UnsupportedContentType(content_type.to_string()));
            }
        }

        let final_url = response.url().to_string();
        let limit = self.config.max_download_bytes;
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ToolError::from_reqwest(e, timeout))?
        {
            let room = limit.saturating_sub(body.len());
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if body.len() >= limit {
                debug!(url = %final_url, limit, "Response body capped");
                break;
            }
        }

        Ok(FetchedPage {
            final_url,
            html: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// Headless Chrome fetcher; plain HTTP when rendering is not requested.
///
/// Chrome follows redirects and loads subresources on its own, so the URL
/// policy only sees the final URL once navigation has finished. A page
/// that lands somewhere forbidden is discarded, but its requests have
/// already been made.
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    http: HttpFetcher,
    validator: Arc<UrlValidator>,
    timeout: std::time::Duration,
}

/// Time left for one render. Every browser step gets what remains, so the
/// render as a whole ends near the budget even when the caller has given up.
#[cfg(feature = "browser")]
struct RenderDeadline {
    started: std::time::Instant,
    budget: std::time::Duration,
}

#[cfg(feature = "browser")]
impl RenderDeadline {
    fn new(budget: std::time::Duration) -> Self {
        Self {
            started: std::time::Instant::now(),
            budget,
        }
    }

    fn remaining(&self) -> Result<std::time::Duration, ToolError> {
        match self.budget.checked_sub(self.started.elapsed()) {
            Some(left) if !left.is_zero() => Ok(left),
            _ => Err(ToolError::Timeout { after: self.budget }),
        }
    }
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    pub fn new(http: HttpFetcher, validator: Arc<UrlValidator>) -> Self {
        let timeout = http.config.request_timeout();
        Self {
            http,
            validator,
            timeout,
        }
    }

    /// Launch a browser for a single page. The browser process ends when
    /// `browser` is dropped at the end of this function.
    fn render(url: &str, timeout: std::time::Duration) -> Result<FetchedPage, ToolError> {
        use headless_chrome::{Browser, LaunchOptions};

        let render_err = |e: &dyn std::fmt::Display| ToolError::Render(e.to_string());
        let deadline = RenderDeadline::new(timeout);

        let options = LaunchOptions::default_builder()
            .headless(true)
            .idle_browser_timeout(deadline.remaining()?)
            .build()
            .map_err(|e| render_err(&e))?;
        let browser = Browser::new(options).map_err(|e| render_err(&e))?;
        let tab = browser.new_tab().map_err(|e| render_err(&e))?;

        tab.set_default_timeout(deadline.remaining()?);
        tab.navigate_to(url).map_err(|e| render_err(&e))?;
        tab.set_default_timeout(deadline.remaining()?);
        tab.wait_until_navigated().map_err(|e| render_err(&e))?;

        deadline.remaining()?;
        let html = tab.get_content().map_err(|e| render_err(&e))?;
        Ok(FetchedPage {
            final_url: tab.get_url(),
            html,
        })
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str, render_js: bool) -> Result<FetchedPage, ToolError> {
        if !render_js {
            return self.http.fetch(url, false).await;
        }

        let timeout = self.timeout;
        let target = url.to_string();
        let task = tokio::task::spawn_blocking(move || Self::render(&target, timeout));

        // The render enforces its own deadline; this only bounds the wait
        // for the blocking thread to report it.
        let page = match tokio::time::timeout(timeout + RENDER_GRACE, task).await {
            Err(_) => return Err(ToolError::Timeout { after: timeout }),
            Ok(Err(join_err)) => return Err(ToolError::Render(join_err.to_string())),
            Ok(Ok(result)) => result?,
        };

        // Navigation may have redirected somewhere the policy forbids
        if let ValidationResult::Invalid(err) = self.validator.validate(&page.final_url) {
            return Err(err.into());
        }
        Ok(page)
    }
}

/// Fetcher for this build: headless Chrome with the `browser` feature,
/// plain HTTP otherwise.
pub fn default_fetcher(validator: Arc<UrlValidator>, config: FetchConfig) -> Arc<dyn PageFetcher> {
    #[cfg(feature = "browser")]
    {
        let http = HttpFetcher::new(validator.clone(), config);
        Arc::new(BrowserFetcher::new(http, validator))
    }

    #[cfg(not(feature = "browser"))]
    {
        Arc::new(HttpFetcher::new(validator, config))
    }
}
