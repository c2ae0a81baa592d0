// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Web Tools MCP Server
//!
//! Serves the `scrape`, `web_search` and `news_search` tools to MCP
//! clients over HTTP + SSE.
//!
//! ## Endpoints
//!
//! - `GET /sse`: open an MCP session
//! - `POST /messages/?session_id=<id>`: send a JSON-RPC message
//! - `POST /tools/:name`: call a tool directly
//! - `GET /health`, `GET /healthz`: liveness
//! - `GET /metrics`: Prometheus metrics
//!
//! ## Configuration
//!
//! Read from environment variables (a `.env` file is honoured):
//!
//! - `MCP_BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `MCP_DEBUG`: Debug logging (default: false)
//! - `MCP_REQUEST_TIMEOUT`: Outbound timeout in seconds (default: 15)
//! - `MCP_MAX_CONTENT_LENGTH`: Scraped text limit in characters (default: 15000)
//! - `MCP_DEFAULT_SEARCH_RESULTS` / `MCP_MIN_SEARCH_RESULTS` /
//!   `MCP_MAX_SEARCH_RESULTS`: Result count bounds (default: 5 / 1 / 20)
//! - `MCP_RATE_LIMIT_SECONDS`: Spacing between searches (default: 1.0)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use web_tools_mcp::{
    config::Config,
    handlers::{router, AppState},
    metrics::Metrics,
    tools::ToolRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    config.validate()?;

    // Initialize tracing
    let level = if config.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();

    info!(
        bind_addr = %config.bind_addr,
        server = %config.server_name,
        request_timeout_secs = config.fetch.request_timeout_secs,
        max_content_length = config.fetch.max_content_length,
        default_results = config.search.default_results,
        max_results = config.search.max_results,
        rate_limit_secs = config.search.rate_limit_secs,
        browser = cfg!(feature = "browser"),
        "Starting web tools MCP server"
    );

    let metrics = Arc::new(Metrics::new()?);
    let registry = Arc::new(ToolRegistry::from_config(&config, metrics.clone()));
    let state = Arc::new(AppState::new(config.clone(), registry, metrics));

    // Spawn session cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state.sessions.cleanup().await;
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
