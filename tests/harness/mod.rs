// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Shared test harness for the web tools service.
//!
//! - `generators`: URL and argument grids for probing the safety layer
//! - `stubs`: recording fetcher and search back end, no network
//! - `probe`: tallies validator outcomes across a grid

#![allow(dead_code)]

pub mod generators;
pub mod probe;
pub mod stubs;

use std::sync::Arc;
use web_tools_mcp::{
    config::Config, metrics::Metrics, tools::ToolRegistry, validator::UrlValidator,
};

/// Registry wired to the given stubs.
pub fn registry_with(
    config: &Config,
    fetcher: Arc<stubs::RecordingFetcher>,
    backend: Arc<stubs::RecordingBackend>,
) -> (ToolRegistry, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new().expect("metrics registry"));
    let registry = ToolRegistry::with_components(
        config,
        Arc::new(UrlValidator::new(config.url_policy.clone())),
        fetcher,
        backend,
        metrics.clone(),
    );
    (registry, metrics)
}

/// Default configuration with the search rate limit switched off.
pub fn unthrottled_config() -> Config {
    let mut config = Config::default();
    config.search.rate_limit_secs = 0.0;
    config
}
