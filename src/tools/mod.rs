// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tool handlers exposed to MCP clients.
//!
//! Each handler runs the safety layer (URL validator, result-count
//! normalizer, rate limiter) before any network I/O and reports every
//! failure as text rather than letting it escape the call.

pub mod backend;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod registry;
pub mod scrape;
pub mod search;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::ToolError;
pub use registry::ToolRegistry;

/// Tool descriptor advertised through `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema for the arguments object
    pub input_schema: Value,
}

/// A single text block of tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Output of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    pub content: Vec<TextContent>,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent::new(text)],
            is_error: false,
        }
    }

    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            content: vec![TextContent::new(format!("Error: {message}"))],
            is_error: true,
        }
    }

    /// All text blocks joined, mostly for tests and logs.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A named operation a model client may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Descriptor for discovery
    fn descriptor(&self) -> ToolDescriptor;

    /// Run the tool on a JSON arguments object.
    async fn call(&self, arguments: &Value) -> Result<String, ToolError>;
}

/// Fetch a string argument, treating blanks as missing.
pub(crate) fn string_arg<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_serialization() {
        let output = ToolOutput::error("boom");
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(
            value,
            json!({"content": [{"type": "text", "text": "Error: boom"}], "isError": true})
        );
    }

    #[test]
    fn test_string_arg() {
        let args = json!({"query": "  rust  ", "blank": "  ", "n": 3});
        assert_eq!(string_arg(&args, "query"), Some("rust"));
        assert_eq!(string_arg(&args, "blank"), None);
        assert_eq!(string_arg(&args, "n"), None);
        assert_eq!(string_arg(&args, "missing"), None);
    }
}
