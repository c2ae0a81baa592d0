// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Web Tools MCP Server
//!
//! Exposes three tools to model clients over the Model Context Protocol:
//!
//! - `scrape`: fetch a page and return its readable text
//! - `web_search`: DuckDuckGo web search
//! - `news_search`: DuckDuckGo news search
//!
//! Every tool runs behind a safety layer:
//!
//! - URL validation against private/internal hosts (SSRF)
//! - Result-count normalization into configured bounds
//! - Minimum spacing between search calls
//! - Bounded timeouts and body sizes on all outbound I/O

pub mod config;
pub mod handlers;
pub mod limiter;
pub mod mcp;
pub mod metrics;
pub mod params;
pub mod tools;
pub mod validator;

pub use config::Config;
pub use limiter::{RateLimitResult, RateLimiter};
pub use params::ResultCountNormalizer;
pub use tools::{ToolOutput, ToolRegistry};
pub use validator::{UrlValidator, ValidationResult};
