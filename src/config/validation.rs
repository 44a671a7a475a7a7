//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, addresses parse)
//! - Check the mail section is usable for the selected provider
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{GatewayConfig, MailProvider, RouteLimit};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    for origin in &config.cors.allowed_origins {
        match url::Url::parse(origin) {
            Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => {}
            _ => errors.push(ValidationError::new(
                "cors.allowed_origins",
                format!("'{}' is not an absolute http(s) origin", origin),
            )),
        }
    }

    check_limit(&mut errors, "limits.contact", &config.limits.contact);
    check_limit(&mut errors, "limits.apply", &config.limits.apply);
    check_limit(&mut errors, "limits.pre_meeting", &config.limits.pre_meeting);
    if config.limits.sweep_threshold == 0 {
        errors.push(ValidationError::new("limits.sweep_threshold", "must be > 0"));
    }

    let mail = &config.mail;
    if !looks_like_mailbox(&mail.from) {
        errors.push(ValidationError::new("mail.from", "must contain an email address"));
    }
    if !looks_like_mailbox(&mail.operator_address) {
        errors.push(ValidationError::new(
            "mail.operator_address",
            "must contain an email address",
        ));
    }
    if mail.timeout_secs == 0 {
        errors.push(ValidationError::new("mail.timeout_secs", "must be > 0"));
    }
    if mail.provider == MailProvider::Resend {
        if url::Url::parse(&mail.api_url).is_err() {
            errors.push(ValidationError::new("mail.api_url", "must be an absolute URL"));
        }
        if mail.resolved_api_key().is_none() {
            errors.push(ValidationError::new(
                "mail.api_key",
                "required for the resend provider (or set GATEWAY_MAIL_API_KEY)",
            ));
        }
    }

    if config.careers.watch && config.careers.positions_file.is_none() {
        errors.push(ValidationError::new(
            "careers.watch",
            "requires careers.positions_file",
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }
    if config.security.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "security.request_timeout_secs",
            "must be > 0",
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "is not a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_limit(errors: &mut Vec<ValidationError>, field: &str, limit: &RouteLimit) {
    if limit.max_requests == 0 {
        errors.push(ValidationError::new(
            format!("{}.max_requests", field),
            "must be > 0",
        ));
    }
    if limit.window_secs == 0 {
        errors.push(ValidationError::new(
            format!("{}.window_secs", field),
            "must be > 0",
        ));
    }
}

/// Accepts `addr@host` or `Name <addr@host>`.
fn looks_like_mailbox(value: &str) -> bool {
    let addr = match (value.find('<'), value.rfind('>')) {
        (Some(start), Some(end)) if start < end => &value[start + 1..end],
        _ => value,
    };
    let addr = addr.trim();
    match addr.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.limits.apply.max_requests = 0;
        config.mail.from = "noreply".into();
        config.cors.allowed_origins.push("not a url".into());

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"listener.bind_address"));
        assert!(fields.contains(&"limits.apply.max_requests"));
        assert!(fields.contains(&"mail.from"));
        assert!(fields.contains(&"cors.allowed_origins"));
    }

    #[test]
    fn test_mailbox_forms() {
        assert!(looks_like_mailbox("team@acme.example"));
        assert!(looks_like_mailbox("Acme Careers <careers@acme.example>"));
        assert!(!looks_like_mailbox("Acme Careers"));
        assert!(!looks_like_mailbox("@acme.example"));
    }

    #[test]
    fn test_watch_requires_file() {
        let mut config = GatewayConfig::default();
        config.careers.watch = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "careers.watch");
    }
}
