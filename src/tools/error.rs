// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Errors raised inside tool handlers.
//!
//! None of these leave the tool-call boundary: the registry renders them
//! as an `Error: <message>` text block.

use crate::validator::UrlError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    InvalidArguments(String),

    #[error(transparent)]
    UrlDenied(#[from] UrlError),

    #[error("Rate limit exceeded, retry after {:.1} seconds", .retry_after.as_secs_f64())]
    RateLimited { retry_after: Duration },

    #[error("Request timed out after {:.1} seconds", .after.as_secs_f64())]
    Timeout { after: Duration },

    #[error("Upstream returned HTTP {status}")]
    Status { status: u16 },

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Page render failed: {0}")]
    Render(String),
}

impl ToolError {
    /// Map a reqwest failure, naming the timeout when that is the cause.
    /// A redirect refused by the URL policy keeps the validator's reason.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if let Some(denied) = url_denial(&err) {
            ToolError::UrlDenied(denied)
        } else if err.is_timeout() {
            ToolError::Timeout { after: timeout }
        } else if let Some(status) = err.status() {
            ToolError::Status {
                status: status.as_u16(),
            }
        } else if err.is_redirect() {
            ToolError::Upstream(format!("redirect refused: {err}"))
        } else {
            ToolError::Upstream(err.to_string())
        }
    }
}

fn url_denial(err: &reqwest::Error) -> Option<UrlError> {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(denied) = cause.downcast_ref::<UrlError>() {
            return Some(denied.clone());
        }
        source = cause.source();
    }
    None
}
