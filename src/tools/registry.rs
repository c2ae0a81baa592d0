// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tool registry and dispatch.
//!
//! The registry is the tool-call boundary: whatever a tool returns, the
//! caller gets a [`ToolOutput`], never an error.

use super::backend::{DuckDuckGo, SearchBackend, SearchKind};
use super::fetch::{default_fetcher, PageFetcher};
use super::scrape::ScrapeTool;
use super::search::SearchTool;
use super::{Tool, ToolDescriptor, ToolError, ToolOutput};
use crate::config::{Config, RateLimitScope};
use crate::limiter::RateLimiter;
use crate::metrics::{CallOutcome, Metrics};
use crate::params::ResultCountNormalizer;
use crate::validator::UrlValidator;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    metrics: Arc<Metrics>,
}

impl ToolRegistry {
    /// Registry wired to the live DuckDuckGo back end and the fetcher
    /// selected at compile time.
    pub fn from_config(config: &Config, metrics: Arc<Metrics>) -> Self {
        let validator = Arc::new(UrlValidator::new(config.url_policy.clone()));
        let fetcher = default_fetcher(validator.clone(), config.fetch.clone());
        let backend: Arc<dyn SearchBackend> = Arc::new(DuckDuckGo::new(config.fetch.clone()));
        Self::with_components(config, validator, fetcher, backend, metrics)
    }

    /// Registry with caller-supplied fetcher and back end.
    pub fn with_components(
        config: &Config,
        validator: Arc<UrlValidator>,
        fetcher: Arc<dyn PageFetcher>,
        backend: Arc<dyn SearchBackend>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let interval = config.search.rate_limit_interval();
        let timeout = config.fetch.request_timeout();
        let normalizer = ResultCountNormalizer::new(&config.search);

        let web_limiter = Arc::new(RateLimiter::new(interval));
        let news_limiter = match config.search.rate_limit_scope {
            RateLimitScope::Shared => web_limiter.clone(),
            RateLimitScope::PerTool => Arc::new(RateLimiter::new(interval)),
        };

        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(ScrapeTool::new(
                validator,
                fetcher,
                metrics.clone(),
                config.fetch.max_content_length,
            )),
            Arc::new(SearchTool::new(
                SearchKind::Web,
                backend.clone(),
                web_limiter,
                normalizer,
                metrics.clone(),
                timeout,
            )),
            Arc::new(SearchTool::new(
                SearchKind::News,
                backend,
                news_limiter,
                normalizer,
                metrics.clone(),
                timeout,
            )),
        ];

        Self { tools, metrics }
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|t| t.descriptor().name == name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Invoke `name` with `arguments`. Non-object arguments are treated as
    /// an empty object.
    pub async fn call(&self, name: &str, arguments: &Value) -> ToolOutput {
        let Some(tool) = self.get(name) else {
            warn!(tool = name, "Unknown tool requested");
            self.metrics.record_call("unknown", CallOutcome::Error);
            return ToolOutput::error(ToolError::UnknownTool(name.to_string()));
        };

        let empty = Value::Object(Map::new());
        let arguments = if arguments.is_object() {
            arguments
        } else {
            &empty
        };

        match tool.call(arguments).await {
            Ok(text) => {
                info!(tool = name, "Tool call succeeded");
                self.metrics.record_call(name, CallOutcome::Success);
                ToolOutput::text(text)
            }
            Err(err) => {
                error!(tool = name, error = %err, "Tool call failed");
                self.metrics.record_call(name, CallOutcome::Error);
                ToolOutput::error(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::backend::SearchHit;
    use crate::tools::fetch::FetchedPage;
    use async_trait::async_trait;
    use serde_json::json;

    struct NoFetch;

    #[async_trait]
    impl PageFetcher for NoFetch {
        async fn fetch(&self, _url: &str, _render_js: bool) -> Result<FetchedPage, ToolError> {
            Err(ToolError::Upstream("offline".to_string()))
        }
    }

    struct NoSearch;

    #[async_trait]
    impl SearchBackend for NoSearch {
        async fn search(
            &self,
            _kind: SearchKind,
            _query: &str,
            _max_results: usize,
        ) -> Result<Vec<SearchHit>, ToolError> {
            Ok(Vec::new())
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::with_components(
            &Config::default(),
            Arc::new(UrlValidator::default()),
            Arc::new(NoFetch),
            Arc::new(NoSearch),
            Arc::new(Metrics::new().unwrap()),
        )
    }

    #[test]
    fn test_descriptors() {
        let names: Vec<String> = registry().descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["scrape", "web_search", "news_search"]);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let output = registry().call("teleport", &json!({})).await;
        assert!(output.is_error);
        assert_eq!(output.joined_text(), "Error: Unknown tool: teleport");
    }

    #[tokio::test]
    async fn test_non_object_arguments() {
        let output = registry().call("web_search", &json!("rust")).await;
        assert!(output.is_error);
        assert_eq!(output.joined_text(), "Error: No search query provided");
    }

    #[tokio::test]
    async fn test_failure_is_text() {
        let registry = registry();
        let output = registry
            .call("scrape", &json!({"url": "https://example.com"}))
            .await;
        assert!(output.is_error);
        assert_eq!(output.joined_text(), "Error: Upstream request failed: offline");
        assert_eq!(registry.metrics.tool_calls("scrape", CallOutcome::Error), 1);
    }
}
