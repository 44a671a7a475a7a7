//! Security audit events.
//!
//! Every security-relevant rejection is written as a structured event on the
//! `security_audit` tracing target so it can be routed to a separate sink.
//! Events are a side effect only; they never change the response.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::observability::metrics;

/// Kinds of security-relevant rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    MethodNotAllowed,
    InvalidContentType,
    RateLimitExceeded,
    ValidationFailed,
    SpamDetected,
    FileRejected,
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::InvalidContentType => "invalid_content_type",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::ValidationFailed => "validation_failed",
            Self::SpamDetected => "spam_detected",
            Self::FileRejected => "file_rejected",
        }
    }
}

/// One audit record.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    pub event: SecurityEventKind,
    pub client_ip: String,
    pub route: &'static str,
    pub timestamp: DateTime<Utc>,
    pub details: Map<String, Value>,
}

impl SecurityEvent {
    pub fn new(event: SecurityEventKind, client_ip: &str, route: &'static str) -> Self {
        Self {
            event,
            client_ip: client_ip.to_string(),
            route,
            timestamp: Utc::now(),
            details: Map::new(),
        }
    }

    /// Attach a contextual detail.
    pub fn detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Write the event to the audit target and bump its counter.
    pub fn emit(self) {
        metrics::record_security_event(self.event.as_str());
        let details = Value::Object(self.details);
        tracing::warn!(
            target: "security_audit",
            event = self.event.as_str(),
            client_ip = %self.client_ip,
            route = self.route,
            timestamp = %self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            details = %details,
            "Security event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_details() {
        let event = SecurityEvent::new(SecurityEventKind::RateLimitExceeded, "203.0.113.9", "contact")
            .detail("retry_after", 42)
            .detail("limit", 5);

        assert_eq!(event.client_ip, "203.0.113.9");
        assert_eq!(event.details["retry_after"], 42);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "rate_limit_exceeded");
        assert_eq!(json["route"], "contact");
    }

    #[test]
    fn test_emit_without_subscriber() {
        SecurityEvent::new(SecurityEventKind::SpamDetected, "unknown", "contact").emit();
    }

    #[test]
    fn test_emit_with_details() {
        SecurityEvent::new(SecurityEventKind::FileRejected, "198.51.100.4", "apply")
            .detail("reason", "signature mismatch")
            .detail("size", 1024)
            .emit();
    }
}
