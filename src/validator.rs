// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! URL safety validator.
//!
//! Decides whether an outbound fetch may be performed:
//! - URL presence and type
//! - Scheme allow-list (http/https by default)
//! - Host presence
//! - Private/internal host block-list (SSRF defense)
//!
//! The block-list is a literal, case-insensitive prefix match on the host,
//! not a subnet computation. `172.16.` to `172.31.` are therefore sixteen
//! separate entries, and any host that merely starts with a blocked token
//! (`localhost.example.com`) is refused as well.

use crate::config::UrlPolicyConfig;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Reasons a URL is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,

    #[error("URL must be a string")]
    NotAString,

    #[error("Invalid URL format: {0}")]
    Malformed(String),

    #[error("URL must include a scheme (http:// or https://)")]
    MissingScheme,

    #[error("URL scheme '{scheme}' is not allowed. Use {}", .allowed.join(" or "))]
    SchemeNotAllowed { scheme: String, allowed: Vec<String> },

    #[error("URL must include a host")]
    MissingHost,

    #[error("Access to internal/private addresses is not allowed")]
    BlockedHost { host: String },
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// URL may be fetched
    Valid,
    /// URL must not be fetched
    Invalid(UrlError),
}

impl ValidationResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&UrlError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }

    /// Human-readable reason, empty when allowed.
    pub fn reason(&self) -> String {
        self.error().map(ToString::to_string).unwrap_or_default()
    }
}

/// URL safety validator.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    allowed_schemes: Vec<String>,
    blocked_hosts: Vec<String>,
}

impl UrlValidator {
    /// Create a new validator with the given policy.
    pub fn new(config: UrlPolicyConfig) -> Self {
        let lower = |v: Vec<String>| -> Vec<String> {
            v.into_iter().map(|s| s.trim().to_lowercase()).collect()
        };
        Self {
            allowed_schemes: lower(config.allowed_schemes),
            blocked_hosts: lower(config.blocked_hosts),
        }
    }

    /// Validate an untyped tool argument.
    pub fn validate_value(&self, value: Option<&Value>) -> ValidationResult {
        match value {
            None | Some(Value::Null) => ValidationResult::Invalid(UrlError::Empty),
            Some(Value::String(url)) => self.validate(url),
            Some(other) => {
                debug!(value = %other, "URL argument is not a string");
                ValidationResult::Invalid(UrlError::NotAString)
            }
        }
    }

    /// Validate a URL string.
    pub fn validate(&self, url: &str) -> ValidationResult {
        let url = url.trim();
        if url.is_empty() {
            return ValidationResult::Invalid(UrlError::Empty);
        }

        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                debug!(url = %url, "URL has no scheme");
                return ValidationResult::Invalid(UrlError::MissingScheme);
            }
            Err(url::ParseError::EmptyHost) => {
                // "ftp://" fails on its host before the scheme is looked at
                return match url.split_once(':') {
                    Some((scheme, _)) if !self.scheme_allowed(scheme) => {
                        ValidationResult::Invalid(self.scheme_error(scheme))
                    }
                    _ => ValidationResult::Invalid(UrlError::MissingHost),
                };
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to parse URL");
                return ValidationResult::Invalid(UrlError::Malformed(e.to_string()));
            }
        };

        if !self.scheme_allowed(parsed.scheme()) {
            debug!(url = %url, scheme = %parsed.scheme(), "URL scheme not allowed");
            return ValidationResult::Invalid(self.scheme_error(parsed.scheme()));
        }

        let host = match parsed.host_str() {
            Some(h) if !h.is_empty() => normalize_host(h),
            _ => return ValidationResult::Invalid(UrlError::MissingHost),
        };

        if let Some(blocked) = self.blocked_prefix(&host) {
            warn!(url = %url, host = %host, blocked = %blocked, "Blocked URL to private host");
            return ValidationResult::Invalid(UrlError::BlockedHost { host });
        }

        debug!(url = %url, host = %host, "URL allowed");
        ValidationResult::Valid
    }

    fn scheme_allowed(&self, scheme: &str) -> bool {
        let scheme = scheme.to_lowercase();
        self.allowed_schemes.iter().any(|s| *s == scheme)
    }

    fn scheme_error(&self, scheme: &str) -> UrlError {
        UrlError::SchemeNotAllowed {
            scheme: scheme.to_string(),
            allowed: self.allowed_schemes.clone(),
        }
    }

    fn blocked_prefix(&self, host: &str) -> Option<&str> {
        self.blocked_hosts
            .iter()
            .find(|blocked| host == blocked.as_str() || host.starts_with(blocked.as_str()))
            .map(String::as_str)
    }
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self::new(UrlPolicyConfig::default())
    }
}

/// Lowercase a host and drop a `:port` suffix unless it is a bracketed IPv6
/// literal.
fn normalize_host(host: &str) -> String {
    let host = host.to_lowercase();
    if host.starts_with('[') {
        return host;
    }
    match host.split_once(':') {
        Some((name, _port)) => name.to_string(),
        None => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn default_validator() -> UrlValidator {
        UrlValidator::default()
    }

    #[test]
    fn test_valid_urls() {
        let validator = default_validator();

        let result = validator.validate("https://example.com");
        assert!(result.is_allowed());
        assert_eq!(result.reason(), "");

        assert!(validator.validate("http://example.com/path?query=1").is_allowed());
        assert!(validator.validate("HTTPS://EXAMPLE.COM/").is_allowed());
    }

    #[test]
    fn test_empty_and_non_string() {
        let validator = default_validator();

        assert_eq!(validator.validate("").error(), Some(&UrlError::Empty));
        assert_eq!(validator.validate("   ").error(), Some(&UrlError::Empty));
        assert_eq!(validator.validate_value(None).error(), Some(&UrlError::Empty));
        assert_eq!(
            validator.validate_value(Some(&Value::Null)).error(),
            Some(&UrlError::Empty)
        );
        assert_eq!(
            validator.validate_value(Some(&json!(42))).error(),
            Some(&UrlError::NotAString)
        );
        assert!(validator
            .validate_value(Some(&json!("https://example.com")))
            .is_allowed());
    }

    #[test]
    fn test_missing_scheme() {
        let validator = default_validator();

        for url in ["example.com", "example.com/path", "//example.com/", "://missing-scheme.com/"] {
            let result = validator.validate(url);
            assert!(!result.is_allowed(), "{url} should be denied");
            assert!(result.reason().to_lowercase().contains("scheme"), "{url}: {}", result.reason());
        }
    }

    #[test]
    fn test_disallowed_schemes() {
        let validator = default_validator();

        for url in [
            "file:///etc/passwd",
            "ftp://example.com/file",
            "ftp://",
            "javascript:alert(1)",
            "gopher://example.com/",
            "data:text/html,<script>",
        ] {
            let result = validator.validate(url);
            assert!(
                matches!(result.error(), Some(UrlError::SchemeNotAllowed { .. })),
                "{url} should be refused for its scheme, got {result:?}"
            );
            assert!(result.reason().contains("not allowed"));
        }

        let reason = validator.validate("file:///etc/passwd").reason();
        assert!(reason.contains("'file'"));
        assert!(reason.contains("http or https"));
    }

    #[test]
    fn test_missing_host() {
        let validator = default_validator();
        assert_eq!(validator.validate("https://").error(), Some(&UrlError::MissingHost));
    }

    #[test]
    fn test_blocked_hosts() {
        let validator = default_validator();

        for url in [
            "http://localhost/admin",
            "http://LOCALHOST:3000/",
            "http://127.0.0.1:8080/secret",
            "http://10.0.0.1/internal",
            "http://192.168.1.1/router",
            "http://172.16.0.1/internal",
            "http://172.31.255.255/",
            "http://169.254.169.254/latest/meta-data/",
            "http://[::1]/",
            "http://[::1]:8080/",
            "http://[fe80::1]/",
        ] {
            let result = validator.validate(url);
            assert!(
                matches!(result.error(), Some(UrlError::BlockedHost { .. })),
                "{url} should be blocked, got {result:?}"
            );
            assert!(result.reason().contains("internal/private"));
        }
    }

    #[test]
    fn test_prefix_match_is_literal() {
        let validator = default_validator();

        // Coarse on purpose: a public name that starts with a blocked token
        assert!(!validator.validate("https://localhost.example.com/").is_allowed());
        // Neighbouring ranges are not covered
        assert!(validator.validate("http://172.15.0.1/").is_allowed());
        assert!(validator.validate("http://172.32.0.1/").is_allowed());
        assert!(validator.validate("http://11.0.0.1/").is_allowed());
    }

    #[test]
    fn test_port_and_whitespace() {
        let validator = default_validator();
        assert!(validator.validate("  https://example.com  ").is_allowed());
        assert!(validator.validate("https://example.com:8443/api").is_allowed());
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("Example.COM"), "example.com");
        assert_eq!(normalize_host("example.com:8443"), "example.com");
        assert_eq!(normalize_host("[::1]:8080"), "[::1]:8080");
        assert_eq!(normalize_host("[FE80::1]"), "[fe80::1]");
    }

    #[test]
    fn test_custom_policy() {
        let validator = UrlValidator::new(UrlPolicyConfig {
            allowed_schemes: vec!["HTTPS".to_string()],
            blocked_hosts: vec!["Internal.".to_string()],
        });

        assert!(validator.validate("https://example.com").is_allowed());
        assert!(!validator.validate("http://example.com").is_allowed());
        assert!(!validator.validate("https://internal.corp.example/").is_allowed());
        // Default block-list no longer applies
        assert!(validator.validate("https://localhost/").is_allowed());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let validator = default_validator();
        for url in ["https://example.com", "http://10.0.0.1/", "example.com", ""] {
            assert_eq!(validator.validate(url), validator.validate(url));
        }
    }
}
