// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Bounded normalization of untrusted result counts.
//!
//! Whatever a model-driven caller sends for `max_results`, the output is an
//! integer inside `[min, max]`. Values that cannot be read as an integer
//! fall back to the default with a warning; they are never an error.

use crate::config::SearchConfig;
use serde_json::Value;
use std::num::IntErrorKind;
use tracing::{debug, warn};

/// Clamps result counts into configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultCountNormalizer {
    default: u32,
    min: u32,
    max: u32,
}

impl ResultCountNormalizer {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            default: config.default_results,
            min: config.min_results,
            max: config.max_results,
        }
    }

    /// Normalize with the configured default and bounds.
    pub fn normalize(&self, value: Option<&Value>) -> u32 {
        self.normalize_with(value, None, None, None)
    }

    /// Normalize, overriding any of the configured default and bounds.
    pub fn normalize_with(
        &self,
        value: Option<&Value>,
        default: Option<u32>,
        min: Option<u32>,
        max: Option<u32>,
    ) -> u32 {
        let default = default.unwrap_or(self.default);
        let min = min.unwrap_or(self.min);
        let max = max.unwrap_or(self.max);

        let value = match value {
            None | Some(Value::Null) => return default,
            Some(v) => v,
        };

        let Some(result) = coerce_integer(value) else {
            warn!(value = %value, default, "Invalid max_results value, using default");
            return default;
        };

        if result < i64::from(min) {
            debug!(result, min, "max_results below minimum, clamping");
            return min;
        }
        if result > i64::from(max) {
            debug!(result, max, "max_results above maximum, clamping");
            return max;
        }

        // Inside [min, max], so it fits in u32
        u32::try_from(result).unwrap_or(default)
    }
}

impl Default for ResultCountNormalizer {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

/// Read a JSON value as an integer the way a lenient caller would expect.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => parse_integer(s),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_integer(s: &str) -> Option<i64> {
    match s.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}
