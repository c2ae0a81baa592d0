// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Search back ends.
//!
//! DuckDuckGo needs no API key: web results come from the HTML endpoint,
//! news results from the `news.js` JSON endpoint, which first needs a
//! `vqd` token scraped from the regular search page.

use crate::config::FetchConfig;
use crate::tools::ToolError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;
use url::Url;

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const DDG_HOME_URL: &str = "https://duckduckgo.com/";
const DDG_NEWS_URL: &str = "https://duckduckgo.com/news.js";

/// Which index to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Web,
    News,
}

/// One search result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Publisher, news only
    pub source: Option<String>,
    /// Publication date (YYYY-MM-DD), news only
    pub published: Option<String>,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        kind: SearchKind,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ToolError>;
}

/// DuckDuckGo back end.
pub struct DuckDuckGo {
    config: FetchConfig,
}

impl DuckDuckGo {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    /// One client per search; dropped when the search returns.
    fn build_client(&self) -> Result<reqwest::Client, ToolError> {
        reqwest::Client::builder()
            .timeout(self.config.request_timeout())
            .user_agent(self.config.user_agent.as_str())
            .build()
            .map_err(|e| ToolError::Upstream(format!("client setup failed: {e}")))
    }

    async fn get_text(&self, request: reqwest::RequestBuilder) -> Result<String, ToolError> {
        let timeout = self.config.request_timeout();
        let response = request
            .send()
            .await
            .map_err(|e| ToolError::from_reqwest(e, timeout))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Status {
                status: status.as_u16(),
            });
        }
        response
            .text()
            .await
            .map_err(|e| ToolError::from_reqwest(e, timeout))
    }

    async fn web(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ToolError> {
        let client = self.build_client()?;
        let html = self
            .get_text(client.post(DDG_HTML_URL).form(&[("q", query)]))
            .await?;
        Ok(parse_web_results(&html, max_results))
    }

    async fn news(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ToolError> {
        let client = self.build_client()?;

        let landing = self
            .get_text(client.get(DDG_HOME_URL).query(&[("q", query)]))
            .await?;
        let vqd = extract_vqd(&landing)
            .ok_or_else(|| ToolError::Upstream("news search token not found".to_string()))?;
        debug!(query = %query, "Obtained news search token");

        let body = self
            .get_text(client.get(DDG_NEWS_URL).query(&[
                ("l", "us-en"),
                ("o", "json"),
                ("noamp", "1"),
                ("q", query),
                ("vqd", vqd.as_str()),
                ("p", "-1"),
            ]))
            .await?;
        parse_news_results(&body, max_results)
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGo {
    async fn search(
        &self,
        kind: SearchKind,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ToolError> {
        match kind {
            SearchKind::Web => self.web(query, max_results).await,
            SearchKind::News => self.news(query, max_results).await,
        }
    }
}

/// Parse the DuckDuckGo HTML results page, skipping ads.
pub fn parse_web_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let doc = Html::parse_document(html);
    let (Ok(result_sel), Ok(link_sel), Ok(snippet_sel)) = (
        Selector::parse(".result:not(.result--ad)"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    doc.select(&result_sel)
        .filter_map(|result| {
            let link = result.select(&link_sel).next()?;
            let title = normalize_text(&link.text().collect::<String>());
            if title.is_empty() {
                return None;
            }
            let url = resolve_result_url(link.value().attr("href").unwrap_or_default());
            let snippet = result
                .select(&snippet_sel)
                .next()
                .map(|el| normalize_text(&el.text().collect::<String>()))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "No description".to_string());
            Some(SearchHit {
                title,
                url,
                snippet,
                ..Default::default()
            })
        })
        .take(max_results)
        .collect()
}

/// DuckDuckGo wraps result links as `//duckduckgo.com/l/?uddg=<encoded>`.
fn resolve_result_url(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    Url::parse(&absolute)
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or_else(|| href.to_string())
}

fn extract_vqd(html: &str) -> Option<String> {
    let re = Regex::new(r#"vqd=["']?([0-9-]+)"#).ok()?;
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    date: Option<i64>,
}

/// Parse the `news.js` JSON payload.
pub fn parse_news_results(body: &str, max_results: usize) -> Result<Vec<SearchHit>, ToolError> {
    let response: NewsResponse = serde_json::from_str(body)
        .map_err(|e| ToolError::Upstream(format!("unreadable news response: {e}")))?;

    Ok(response
        .results
        .into_iter()
        .filter(|item| !item.title.trim().is_empty())
        .take(max_results)
        .map(|item| SearchHit {
            title: strip_markup(&item.title),
            url: item.url,
            snippet: strip_markup(&item.excerpt),
            source: item.source.filter(|s| !s.trim().is_empty()),
            published: item
                .date
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
                .map(|dt| dt.format("%Y-%m-%d").to_string()),
        })
        .collect())
}

/// Drop inline tags such as `<b>` and decode entities.
fn strip_markup(fragment: &str) -> String {
    let doc = Html::parse_fragment(fragment);
    normalize_text(&doc.root_element().text().collect::<String>())
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
