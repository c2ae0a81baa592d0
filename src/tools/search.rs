// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! `web_search` and `news_search`.

use super::backend::{SearchBackend, SearchHit, SearchKind};
use super::{string_arg, Tool, ToolDescriptor, ToolError};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::Metrics;
use crate::params::ResultCountNormalizer;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct SearchTool {
    kind: SearchKind,
    backend: Arc<dyn SearchBackend>,
    limiter: Arc<RateLimiter>,
    normalizer: ResultCountNormalizer,
    metrics: Arc<Metrics>,
    timeout: Duration,
}

impl SearchTool {
    pub fn new(
        kind: SearchKind,
        backend: Arc<dyn SearchBackend>,
        limiter: Arc<RateLimiter>,
        normalizer: ResultCountNormalizer,
        metrics: Arc<Metrics>,
        timeout: Duration,
    ) -> Self {
        Self {
            kind,
            backend,
            limiter,
            normalizer,
            metrics,
            timeout,
        }
    }

    fn name(&self) -> &'static str {
        match self.kind {
            SearchKind::Web => "web_search",
            SearchKind::News => "news_search",
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn descriptor(&self) -> ToolDescriptor {
        let description = match self.kind {
            SearchKind::Web => "Search the web using DuckDuckGo. Use this to find current information, facts, or anything not in your training data.",
            SearchKind::News => "Search recent news articles using DuckDuckGo News. Use this for current events and headlines.",
        };
        ToolDescriptor {
            name: self.name().to_string(),
            description: description.to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query to look up"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results to return",
                        "default": self.normalizer.normalize(None)
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, arguments: &Value) -> Result<String, ToolError> {
        let query = string_arg(arguments, "query")
            .ok_or_else(|| ToolError::InvalidArguments("No search query provided".to_string()))?;
        let max_results = self.normalizer.normalize(arguments.get("max_results"));

        if let RateLimitResult::Limited { retry_after } = self.limiter.check().await {
            warn!(tool = self.name(), ?retry_after, "Search rate limited");
            self.metrics.record_rate_limited();
            return Err(ToolError::RateLimited { retry_after });
        }

        info!(tool = self.name(), query = %query, max_results, "Searching");
        let hits = tokio::time::timeout(
            self.timeout,
            self.backend.search(self.kind, query, max_results as usize),
        )
        .await
        .map_err(|_| ToolError::Timeout {
            after: self.timeout,
        })??;

        info!(tool = self.name(), results = hits.len(), "Search finished");
        if hits.is_empty() {
            return Ok(format!("No results found for: {query}"));
        }
        Ok(format_hits(self.kind, query, &hits))
    }
}

fn format_hits(kind: SearchKind, query: &str, hits: &[SearchHit]) -> String {
    let heading = match kind {
        SearchKind::Web => "Search Results",
        SearchKind::News => "News Results",
    };
    let blocks: Vec<String> = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            let mut block = format!(
                "**Result {}:**\nTitle: {}\nURL: {}\n",
                i + 1,
                hit.title,
                hit.url
            );
            if let Some(source) = &hit.source {
                block.push_str(&format!("Source: {source}\n"));
            }
            if let Some(published) = &hit.published {
                block.push_str(&format!("Date: {published}\n"));
            }
            block.push_str(&format!("Snippet: {}\n", hit.snippet));
            block
        })
        .collect();

    format!("## {heading} for: {query}\n\n{}", blocks.join("\n---\n"))
}
