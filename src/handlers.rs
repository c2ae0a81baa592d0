// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the web tools service.
//!
//! MCP clients connect with `GET /sse`, receive an `endpoint` event naming
//! their message URL, and post JSON-RPC messages there. Replies arrive on
//! the SSE stream as `message` events. `POST /tools/:name` invokes a tool
//! directly for scripts and smoke tests.

use crate::config::Config;
use crate::mcp::protocol::error_codes;
use crate::mcp::{JsonRpcRequest, JsonRpcResponse, McpServer, SessionStore};
use crate::metrics::Metrics;
use crate::tools::ToolRegistry;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub mcp: McpServer,
    pub sessions: SessionStore,
    pub metrics: Arc<Metrics>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, registry: Arc<ToolRegistry>, metrics: Arc<Metrics>) -> Self {
        let mcp = McpServer::new(registry, config.server_name.clone());
        Self {
            config,
            mcp,
            sessions: SessionStore::new(),
            metrics,
            started_at: Utc::now(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub server: String,
    pub version: &'static str,
    pub debug: bool,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/sse", get(sse_connect))
        .route("/messages/", post(post_message))
        .route("/tools/:name", post(call_tool));

    if state.config.metrics.enabled {
        app = app.route(state.config.metrics.path.as_str(), get(metrics));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        server: state.config.server_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        debug: state.config.debug,
        started_at: state.started_at,
    })
}

/// Open an MCP session stream.
pub async fn sse_connect(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (session_id, rx) = state.sessions.open().await;
    info!(session_id = %session_id, "MCP client connected");

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages/?session_id={session_id}"));

    let messages = stream::unfold(rx, |mut rx| async move {
        let response = rx.recv().await?;
        let event = match serde_json::to_string(&response) {
            Ok(data) => Event::default().event("message").data(data),
            Err(e) => {
                error!(error = %e, "Failed to serialize MCP response");
                Event::default().comment("dropped unserializable response")
            }
        };
        Some((Ok(event), rx))
    });

    let events = stream::once(async move { Ok::<_, Infallible>(endpoint) }).chain(messages);

    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// Accept one JSON-RPC message for a session.
///
/// The reply, if any, is pushed onto the session's SSE stream.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> Response {
    let Ok(session_id) = Uuid::parse_str(&query.session_id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid session id", "INVALID_SESSION")),
        )
            .into_response();
    };

    let Some(tx) = state.sessions.sender(&session_id).await else {
        warn!(session_id = %session_id, "Message for unknown session");
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Unknown session", "UNKNOWN_SESSION")),
        )
            .into_response();
    };

    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!(session_id = %session_id, error = %e, "Malformed MCP message");
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {e}"),
                )),
            )
                .into_response();
        }
    };

    let task_state = state.clone();
    tokio::spawn(async move {
        if let Some(response) = task_state.mcp.handle(request).await {
            if tx.send(response).await.is_err() {
                debug!(session_id = %session_id, "Session closed before reply");
            }
        }
    });

    StatusCode::ACCEPTED.into_response()
}

/// Invoke a tool directly with a JSON arguments object.
pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(arguments): Json<Value>,
) -> Response {
    let registry = state.mcp.registry();
    if !registry.contains(&name) {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                format!("Unknown tool: {name}"),
                "UNKNOWN_TOOL",
            )),
        )
            .into_response();
    }

    let output = registry.call(&name, &arguments).await;
    (StatusCode::OK, Json(output)).into_response()
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
