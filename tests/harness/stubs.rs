// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-memory stand-ins for the network edges.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use web_tools_mcp::tools::backend::{SearchBackend, SearchHit, SearchKind};
use web_tools_mcp::tools::fetch::{FetchedPage, PageFetcher};
use web_tools_mcp::tools::ToolError;

/// Page fetcher that records every URL it is asked for.
pub struct RecordingFetcher {
    html: Option<String>,
    requested: Mutex<Vec<(String, bool)>>,
}

impl RecordingFetcher {
    /// Serves `html` for every URL.
    pub fn serving(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Fails every fetch with an upstream error.
    pub fn failing() -> Self {
        Self {
            html: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    /// URLs and `render_js` flags, in call order.
    pub fn requested(&self) -> Vec<(String, bool)> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str, render_js: bool) -> Result<FetchedPage, ToolError> {
        self.requested
            .lock()
            .unwrap()
            .push((url.to_string(), render_js));
        match &self.html {
            Some(html) => Ok(FetchedPage {
                final_url: url.to_string(),
                html: html.clone(),
            }),
            None => Err(ToolError::Upstream("connection refused".to_string())),
        }
    }
}

/// Search back end that returns canned hits and counts calls.
pub struct RecordingBackend {
    hits: Vec<SearchHit>,
    fail: bool,
    calls: AtomicUsize,
    last_request: Mutex<Option<(SearchKind, String, usize)>>,
}

impl RecordingBackend {
    /// Returns `count` generated hits per search, capped at the requested
    /// maximum.
    pub fn with_hits(count: usize) -> Self {
        let hits = (1..=count)
            .map(|i| SearchHit {
                title: format!("Result title {i}"),
                url: format!("https://site-{i}.example.com/page"),
                snippet: format!("Snippet number {i}"),
                ..Default::default()
            })
            .collect();
        Self::new(hits, false)
    }

    pub fn with_news() -> Self {
        Self::new(
            vec![SearchHit {
                title: "Headline".to_string(),
                url: "https://news.example.com/story".to_string(),
                snippet: "Something happened".to_string(),
                source: Some("Example Times".to_string()),
                published: Some("2024-03-01".to_string()),
            }],
            false,
        )
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), false)
    }

    pub fn failing() -> Self {
        Self::new(Vec::new(), true)
    }

    fn new(hits: Vec<SearchHit>, fail: bool) -> Self {
        Self {
            hits,
            fail,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(SearchKind, String, usize)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for RecordingBackend {
    async fn search(
        &self,
        kind: SearchKind,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((kind, query.to_string(), max_results));
        if self.fail {
            return Err(ToolError::Status { status: 503 });
        }
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}
