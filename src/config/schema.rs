//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the submission gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Cross-origin policy for the browser front-end.
    pub cors: CorsConfig,

    /// Per-route rate limits.
    pub limits: LimitsConfig,

    /// Outbound mail settings.
    pub mail: MailConfig,

    /// Open job postings used to cross-check applications.
    pub careers: CareersConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to read responses. Matched exactly.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

/// A single `(max_requests, window)` pair.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteLimit {
    /// Requests admitted per window.
    pub max_requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl RouteLimit {
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Contact form.
    pub contact: RouteLimit,

    /// Job applications.
    pub apply: RouteLimit,

    /// Pre-meeting notifications.
    pub pre_meeting: RouteLimit,

    /// Record count above which stale records are swept inline.
    pub sweep_threshold: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            contact: RouteLimit::new(5, 60),
            apply: RouteLimit::new(3, 3600),
            pre_meeting: RouteLimit::new(5, 60),
            sweep_threshold: 1000,
        }
    }
}

/// Which mail backend delivers outbound messages.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// Resend-compatible HTTP API.
    Resend,
    /// Log messages instead of sending them (development).
    Log,
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MailConfig {
    pub provider: MailProvider,

    /// Base URL of the provider API.
    pub api_url: String,

    /// API key. Falls back to `GATEWAY_MAIL_API_KEY` when empty.
    pub api_key: String,

    /// Fixed sender, e.g. `"Acme Website <noreply@acme.example>"`.
    pub from: String,

    /// Internal address receiving every notification.
    pub operator_address: String,

    /// Deadline for a single send call, in seconds.
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::Log,
            api_url: "https://api.resend.com".to_string(),
            api_key: String::new(),
            from: "Website <noreply@example.com>".to_string(),
            operator_address: "team@example.com".to_string(),
            timeout_secs: 10,
        }
    }
}

impl MailConfig {
    /// Environment variable consulted when `api_key` is empty.
    pub const API_KEY_ENV: &'static str = "GATEWAY_MAIL_API_KEY";

    /// The configured key, or the environment fallback.
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }
        std::env::var(Self::API_KEY_ENV)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Job posting source.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CareersConfig {
    /// Titles currently open, used when no positions file is given.
    pub open_positions: Vec<String>,

    /// Optional TOML file listing postings (`positions = [{ title, open }]`).
    pub positions_file: Option<String>,

    /// Reload the positions file when it changes.
    pub watch: bool,
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Total time allowed for a request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            // base64 inflates a 5 MiB resume to ~6.7 MiB
            max_body_size: 8 * 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.limits.apply, RouteLimit::new(3, 3600));
        assert_eq!(config.limits.contact, RouteLimit::new(5, 60));
        assert_eq!(config.mail.timeout_secs, 10);
        assert_eq!(config.mail.provider, MailProvider::Log);
    }

    #[test]
    fn test_partial_sections() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [limits]
            contact = { max_requests = 10, window_secs = 30 }

            [mail]
            provider = "resend"
            api_key = "re_test"

            [cors]
            allowed_origins = ["https://www.acme.example"]
            "#,
        )
        .unwrap();

        assert_eq!(config.limits.contact, RouteLimit::new(10, 30));
        assert_eq!(config.limits.apply, RouteLimit::new(3, 3600));
        assert_eq!(config.mail.provider, MailProvider::Resend);
        assert_eq!(config.mail.resolved_api_key().as_deref(), Some("re_test"));
        assert_eq!(config.cors.allowed_origins, vec!["https://www.acme.example"]);
    }
}
