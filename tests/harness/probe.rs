// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome tallies for validator probes.

use std::collections::HashMap;
use std::fmt;
use web_tools_mcp::validator::{UrlError, UrlValidator, ValidationResult};

/// Validator verdict classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    Empty,
    MissingScheme,
    SchemeNotAllowed,
    MissingHost,
    Malformed,
    BlockedHost,
}

impl From<&ValidationResult> for Outcome {
    fn from(result: &ValidationResult) -> Self {
        match result.error() {
            None => Outcome::Allowed,
            Some(UrlError::Empty) | Some(UrlError::NotAString) => Outcome::Empty,
            Some(UrlError::MissingScheme) => Outcome::MissingScheme,
            Some(UrlError::SchemeNotAllowed { .. }) => Outcome::SchemeNotAllowed,
            Some(UrlError::MissingHost) => Outcome::MissingHost,
            Some(UrlError::Malformed(_)) => Outcome::Malformed,
            Some(UrlError::BlockedHost { .. }) => Outcome::BlockedHost,
        }
    }
}

/// Tally of outcomes across a URL grid.
#[derive(Debug, Default)]
pub struct ProbeReport {
    outcomes: HashMap<Outcome, usize>,
    /// URLs allowed through, for failure messages
    allowed: Vec<String>,
    /// Denied URLs whose reason was empty
    silent_denials: Vec<String>,
}

impl ProbeReport {
    /// Validate every URL and tally the verdicts.
    pub fn run<S: AsRef<str>>(validator: &UrlValidator, urls: &[S]) -> Self {
        let mut report = Self::default();
        for url in urls {
            let url = url.as_ref();
            let result = validator.validate(url);
            let outcome = Outcome::from(&result);
            *report.outcomes.entry(outcome).or_insert(0) += 1;
            if outcome == Outcome::Allowed {
                report.allowed.push(url.to_string());
            } else if result.reason().is_empty() {
                report.silent_denials.push(url.to_string());
            }
        }
        report
    }

    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn denied(&self) -> usize {
        self.total() - self.count(Outcome::Allowed)
    }

    pub fn allowed_urls(&self) -> &[String] {
        &self.allowed
    }

    pub fn silent_denials(&self) -> &[String] {
        &self.silent_denials
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== URL Probe Report ===")?;
        writeln!(f, "Total:   {}", self.total())?;
        writeln!(f, "Denied:  {}", self.denied())?;
        let mut outcomes: Vec<_> = self.outcomes.iter().collect();
        outcomes.sort_by_key(|(outcome, _)| format!("{outcome:?}"));
        for (outcome, count) in outcomes {
            writeln!(f, "  {outcome:?}: {count}")?;
        }
        Ok(())
    }
}
