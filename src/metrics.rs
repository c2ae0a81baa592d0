// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for tool calls and safety decisions.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Outcome label for `tool_calls_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Success,
    Error,
}

impl CallOutcome {
    fn as_label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Service metrics, registered on a private registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    tool_calls: IntCounterVec,
    url_denials: IntCounter,
    rate_limited: IntCounter,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let tool_calls = IntCounterVec::new(
            Opts::new("tool_calls_total", "Tool invocations by tool and outcome"),
            &["tool", "outcome"],
        )?;
        let url_denials = IntCounter::new(
            "url_denials_total",
            "Outbound fetches refused by the URL safety policy",
        )?;
        let rate_limited = IntCounter::new(
            "rate_limited_total",
            "Search calls refused by the rate limiter",
        )?;

        registry.register(Box::new(tool_calls.clone()))?;
        registry.register(Box::new(url_denials.clone()))?;
        registry.register(Box::new(rate_limited.clone()))?;

        Ok(Self {
            registry,
            tool_calls,
            url_denials,
            rate_limited,
        })
    }

    pub fn record_call(&self, tool: &str, outcome: CallOutcome) {
        self.tool_calls
            .with_label_values(&[tool, outcome.as_label()])
            .inc();
    }

    pub fn record_url_denial(&self) {
        self.url_denials.inc();
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.inc();
    }

    pub fn tool_calls(&self, tool: &str, outcome: CallOutcome) -> u64 {
        self.tool_calls
            .with_label_values(&[tool, outcome.as_label()])
            .get()
    }

    pub fn url_denials(&self) -> u64 {
        self.url_denials.get()
    }

    pub fn rate_limited(&self) -> u64 {
        self.rate_limited.get()
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("url_denials", &self.url_denials.get())
            .field("rate_limited", &self.rate_limited.get())
            .finish_non_exhaustive()
    }
}
