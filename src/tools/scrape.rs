// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! `scrape`: fetch a page and return its readable text.

use super::extract::{extract_page, truncate_chars};
use super::fetch::PageFetcher;
use super::{Tool, ToolDescriptor, ToolError};
use crate::metrics::Metrics;
use crate::validator::{UrlValidator, ValidationResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ScrapeTool {
    validator: Arc<UrlValidator>,
    fetcher: Arc<dyn PageFetcher>,
    metrics: Arc<Metrics>,
    max_content_length: usize,
}

impl ScrapeTool {
    pub fn new(
        validator: Arc<UrlValidator>,
        fetcher: Arc<dyn PageFetcher>,
        metrics: Arc<Metrics>,
        max_content_length: usize,
    ) -> Self {
        Self {
            validator,
            fetcher,
            metrics,
            max_content_length,
        }
    }
}

#[async_trait]
impl Tool for ScrapeTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "scrape".to_string(),
            description: "Fetch a webpage and extract its text content. Use this to get the full content of a URL found in search results.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL to fetch and extract content from"
                    },
                    "wait_for_js": {
                        "type": "boolean",
                        "description": "Render the page in a headless browser before extracting (default: true)",
                        "default": true
                    }
                },
                "required": ["url"]
            }),
        }
    }

    async fn call(&self, arguments: &Value) -> Result<String, ToolError> {
        let url_arg = arguments.get("url");
        let url = match self.validator.validate_value(url_arg) {
            ValidationResult::Valid => url_arg.and_then(Value::as_str).unwrap_or_default().trim(),
            ValidationResult::Invalid(err) => {
                warn!(url = ?url_arg, reason = %err, "Refusing to scrape URL");
                self.metrics.record_url_denial();
                return Err(err.into());
            }
        };
        let wait_for_js = arguments
            .get("wait_for_js")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        info!(url = %url, wait_for_js, "Fetching page");
        let page = match self.fetcher.fetch(url, wait_for_js).await {
            Ok(page) => page,
            Err(ToolError::UrlDenied(err)) => {
                warn!(url = %url, reason = %err, "Refusing redirect target");
                self.metrics.record_url_denial();
                return Err(err.into());
            }
            Err(err) => return Err(err),
        };

        // Parsed document is not Send; keep it out of any await
        let content = extract_page(&page.html);
        let text = truncate_chars(&content.text, self.max_content_length);
        info!(url = %page.final_url, chars = text.chars().count(), "Extracted page text");

        let title = content.title.unwrap_or_else(|| page.final_url.clone());
        Ok(format!("## {title}\nURL: {}\n\n{text}", page.final_url))
    }
}
