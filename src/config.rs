// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the web tools server.
//!
//! Every setting has a default and most can be overridden from the
//! environment (see [`Config::from_env`]).

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration for the web tools service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Name reported by `/health` and the MCP handshake
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// Debug mode. Never enable in production.
    #[serde(default)]
    pub debug: bool,

    /// Outbound fetch limits
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Search result bounds and rate limiting
    #[serde(default)]
    pub search: SearchConfig,

    /// URL safety policy
    #[serde(default)]
    pub url_policy: UrlPolicyConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Limits applied to every outbound fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds (default: 15.0)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: f64,

    /// Maximum extracted text length in characters (default: 15000)
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    /// Maximum response body size in bytes (default: 5 MiB)
    #[serde(default = "default_max_download_bytes")]
    pub max_download_bytes: usize,

    /// Content types accepted from scraped pages
    #[serde(default = "default_content_types")]
    pub allowed_content_types: Vec<String>,

    /// User-Agent sent upstream
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Search result bounds and rate limiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Result count used when the caller gives none (default: 5)
    #[serde(default = "default_search_results")]
    pub default_results: u32,

    /// Smallest result count handed to a back end (default: 1)
    #[serde(default = "default_min_search_results")]
    pub min_results: u32,

    /// Largest result count handed to a back end (default: 20)
    #[serde(default = "default_max_search_results")]
    pub max_results: u32,

    /// Minimum spacing between search calls in seconds (default: 1.0)
    #[serde(default = "default_rate_limit_secs")]
    pub rate_limit_secs: f64,

    /// Whether search tools share one limiter (default: shared)
    #[serde(default)]
    pub rate_limit_scope: RateLimitScope,
}

/// How rate limiters are assigned to search tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitScope {
    /// One limiter for every search tool
    #[default]
    Shared,
    /// One limiter per search tool
    PerTool,
}

impl FromStr for RateLimitScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(Self::Shared),
            "per_tool" | "per-tool" => Ok(Self::PerTool),
            _ => Err(()),
        }
    }
}

/// URL safety policy applied before any outbound fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlPolicyConfig {
    /// Permitted URL schemes (default: http, https)
    #[serde(default = "default_allowed_schemes")]
    pub allowed_schemes: Vec<String>,

    /// Host prefixes treated as private/internal
    #[serde(default = "default_blocked_hosts")]
    pub blocked_hosts: Vec<String>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Configuration that cannot be served.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("search result bounds must satisfy min <= default <= max, got min={min} default={default} max={max}")]
    InvertedResultBounds { min: u32, default: u32, max: u32 },

    #[error("{name} must be a finite, non-negative number of seconds, got {value}")]
    InvalidSeconds { name: &'static str, value: f64 },

    #[error("request timeout must be a positive number of seconds that fits a duration, got {0}")]
    InvalidTimeout(f64),

    #[error("at least one URL scheme must be allowed")]
    NoAllowedSchemes,

    #[error("metrics path must start with '/', got {0:?}")]
    InvalidMetricsPath(String),
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_server_name() -> String {
    "web-tools".to_string()
}

fn default_request_timeout() -> f64 {
    15.0
}

fn default_max_content_length() -> usize {
    15_000
}

fn default_max_download_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_content_types() -> Vec<String> {
    vec!["text/html".to_string(), "application/xhtml+xml".to_string()]
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_search_results() -> u32 {
    5
}

fn default_min_search_results() -> u32 {
    1
}

fn default_max_search_results() -> u32 {
    20
}

fn default_rate_limit_secs() -> f64 {
    1.0
}

fn default_allowed_schemes() -> Vec<String> {
    vec!["http".to_string(), "https".to_string()]
}

fn default_blocked_hosts() -> Vec<String> {
    let mut hosts = vec![
        "localhost".to_string(),
        "127.".to_string(),
        "10.".to_string(),
        "192.168.".to_string(),
    ];
    // 172.16.0.0/12 as sixteen literal prefixes
    hosts.extend((16..=31).map(|octet| format!("172.{octet}.")));
    hosts.extend([
        "169.254.".to_string(), // link-local
        "[::1]".to_string(),    // IPv6 loopback
        "[fe80:".to_string(),   // IPv6 link-local
    ]);
    hosts
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            server_name: default_server_name(),
            debug: false,
            fetch: FetchConfig::default(),
            search: SearchConfig::default(),
            url_policy: UrlPolicyConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            max_content_length: default_max_content_length(),
            max_download_bytes: default_max_download_bytes(),
            allowed_content_types: default_content_types(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_results: default_search_results(),
            min_results: default_min_search_results(),
            max_results: default_max_search_results(),
            rate_limit_secs: default_rate_limit_secs(),
            rate_limit_scope: RateLimitScope::default(),
        }
    }
}

impl Default for UrlPolicyConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: default_allowed_schemes(),
            blocked_hosts: default_blocked_hosts(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl FetchConfig {
    /// Get the outbound request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.request_timeout_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_request_timeout()))
    }
}

impl SearchConfig {
    /// Get the minimum spacing between search calls
    pub fn rate_limit_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.rate_limit_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_rate_limit_secs()))
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unset keys and values that fail to parse keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("MCP_BIND_ADDR").or_else(|| lookup("BIND_ADDR")) {
            config.bind_addr = addr;
        }
        if let Some(name) = lookup("MCP_SERVER_NAME") {
            config.server_name = name;
        }
        if let Some(debug) = lookup("MCP_DEBUG") {
            config.debug = parse_bool(&debug);
        }

        override_parsed(&lookup, "MCP_REQUEST_TIMEOUT", &mut config.fetch.request_timeout_secs);
        override_parsed(&lookup, "MCP_MAX_CONTENT_LENGTH", &mut config.fetch.max_content_length);

        override_parsed(&lookup, "MCP_DEFAULT_SEARCH_RESULTS", &mut config.search.default_results);
        override_parsed(&lookup, "MCP_MIN_SEARCH_RESULTS", &mut config.search.min_results);
        override_parsed(&lookup, "MCP_MAX_SEARCH_RESULTS", &mut config.search.max_results);
        override_parsed(&lookup, "MCP_RATE_LIMIT_SECONDS", &mut config.search.rate_limit_secs);
        override_parsed(&lookup, "MCP_RATE_LIMIT_SCOPE", &mut config.search.rate_limit_scope);

        if let Some(enabled) = lookup("MCP_METRICS_ENABLED") {
            config.metrics.enabled = parse_bool(&enabled);
        }

        config
    }

    /// Check invariants that loading does not enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let search = &self.search;
        if !(search.min_results <= search.default_results
            && search.default_results <= search.max_results)
        {
            return Err(ConfigError::InvertedResultBounds {
                min: search.min_results,
                default: search.default_results,
                max: search.max_results,
            });
        }

        let timeout = self.fetch.request_timeout_secs;
        if timeout <= 0.0 || Duration::try_from_secs_f64(timeout).is_err() {
            return Err(ConfigError::InvalidTimeout(timeout));
        }

        let interval = search.rate_limit_secs;
        if !interval.is_finite() || interval < 0.0 {
            return Err(ConfigError::InvalidSeconds {
                name: "rate limit interval",
                value: interval,
            });
        }

        if self.url_policy.allowed_schemes.is_empty() {
            return Err(ConfigError::NoAllowedSchemes);
        }

        if self.metrics.enabled && !self.metrics.path.starts_with('/') {
            return Err(ConfigError::InvalidMetricsPath(self.metrics.path.clone()));
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(parsed) = lookup(key).and_then(|v| v.trim().parse().ok()) {
        *target = parsed;
    }
}
