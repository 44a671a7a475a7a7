//! Submission state machine.
//!
//! # Data Flow
//! ```text
//! ReceiveRequest
//!     → CheckMethod (POST continues, OPTIONS → 204, else 405)
//!     → CheckContentType (application/json)
//!     → CheckRateLimit (per client, per route)
//!     → ParseBody (JSON object, size-capped)
//!     → ValidateFields (rule table; honeypot → generic 400)
//!     → ValidateAttachment (resume, when present)
//!     → ComposeMessages (escaped HTML)
//!     → Dispatch (each message, under a deadline, never retried)
//!     → RespondSuccess
//! ```
//! The first failing state ends the request with an [`ApiError`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::{Map, Value};

use crate::careers::JobRegistry;
use crate::config::{GatewayConfig, LimitsConfig};
use crate::http::request::{client_ip, content_length, is_json};
use crate::http::response::{ApiError, SubmissionReceipt};
use crate::mail::{MailSender, MessageId, OutboundMessage, SendError};
use crate::observability::{metrics, SecurityEvent, SecurityEventKind};
use crate::resilience::timeouts;
use crate::security::{Admission, RequestGate};
use crate::submission::compose::MessageComposer;
use crate::submission::forms::FormKind;
use crate::validation::file::RESUME_FIELD;
use crate::validation::{check_resume, validate, ValidatedFile, ValidationContext};

/// Non-error end states.
#[derive(Debug)]
pub enum Outcome {
    /// CORS preflight answered with 204.
    Preflight,
    Accepted(SubmissionReceipt),
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Preflight => StatusCode::NO_CONTENT.into_response(),
            Outcome::Accepted(receipt) => receipt.into_response(),
        }
    }
}

/// Everything one submission needs, shared across requests.
pub struct SubmissionPipeline {
    gate: RequestGate,
    limits: LimitsConfig,
    registry: Arc<JobRegistry>,
    mailer: Arc<dyn MailSender>,
    composer: MessageComposer,
    max_body_size: usize,
    dispatch_timeout: Duration,
}

impl SubmissionPipeline {
    pub fn new(
        config: &GatewayConfig,
        gate: RequestGate,
        registry: Arc<JobRegistry>,
        mailer: Arc<dyn MailSender>,
    ) -> Self {
        Self {
            gate,
            limits: config.limits.clone(),
            registry,
            mailer,
            composer: MessageComposer::new(&config.mail.from, &config.mail.operator_address),
            max_body_size: config.security.max_body_size,
            dispatch_timeout: config.mail.timeout(),
        }
    }

    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// Run one request through every state.
    pub async fn handle(&self, form: FormKind, request: Request<Body>) -> Result<Outcome, ApiError> {
        let route = form.route_key();
        let (parts, body) = request.into_parts();
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let client = client_ip(&parts.headers, peer);

        // 1. Method
        if parts.method == Method::OPTIONS {
            return Ok(Outcome::Preflight);
        }
        if parts.method != Method::POST {
            SecurityEvent::new(SecurityEventKind::MethodNotAllowed, &client, route)
                .detail("method", parts.method.as_str())
                .emit();
            return Err(ApiError::MethodNotAllowed);
        }

        // 2. Content type
        if !is_json(&parts.headers) {
            let declared = parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            SecurityEvent::new(SecurityEventKind::InvalidContentType, &client, route)
                .detail("content_type", declared)
                .emit();
            return Err(ApiError::UnsupportedContentType);
        }

        // 3. Rate limit
        let limit = form.limit(&self.limits);
        let admission = self
            .gate
            .admit(&client, route, limit.max_requests, limit.window());
        if let Admission::Denied { retry_after_secs } = admission {
            metrics::record_rate_limited(route);
            SecurityEvent::new(SecurityEventKind::RateLimitExceeded, &client, route)
                .detail("max_requests", limit.max_requests)
                .detail("window_secs", limit.window_secs)
                .detail("retry_after", retry_after_secs)
                .emit();
            return Err(ApiError::RateLimited { retry_after_secs });
        }

        // 4. Body
        let record = self.read_body(&parts.headers, body).await?;

        // 5. Fields
        let open_positions = self.registry.snapshot();
        let mut ctx = ValidationContext::new(Utc::now());
        if form.checks_open_positions() {
            ctx = ctx.with_open_positions(open_positions.as_slice());
        }
        let result = validate(&record, form.rules(), &ctx);
        if result.spam_detected {
            SecurityEvent::new(SecurityEventKind::SpamDetected, &client, route).emit();
            return Err(ApiError::FieldValidationFailed {
                errors: result.errors,
                spam: true,
            });
        }
        let sanitized = match result.into_result() {
            Ok(sanitized) => sanitized,
            Err(errors) => {
                let fields: Vec<&str> = errors.keys().map(String::as_str).collect();
                SecurityEvent::new(SecurityEventKind::ValidationFailed, &client, route)
                    .detail("fields", fields)
                    .emit();
                return Err(ApiError::FieldValidationFailed {
                    errors,
                    spam: false,
                });
            }
        };

        // 6. Attachment
        let resume = self.check_attachment(form, &record, &client)?;

        // 7. Compose
        let messages = self.composer.compose(form, &sanitized, resume.as_ref());

        // 8. Dispatch
        let notification_id = self.send(messages.notification, &client, route).await?;
        let confirmation_id = match messages.confirmation {
            Some(confirmation) => Some(self.send(confirmation, &client, route).await?),
            None => None,
        };

        tracing::info!(
            client_ip = %client,
            route,
            notification_id = %notification_id,
            confirmation = confirmation_id.is_some(),
            "Submission accepted"
        );

        Ok(Outcome::Accepted(SubmissionReceipt {
            message: form.success_message(),
            notification_id,
            confirmation_id,
        }))
    }

    async fn read_body(&self, headers: &HeaderMap, body: Body) -> Result<Map<String, Value>, ApiError> {
        if content_length(headers).is_some_and(|len| len > self.max_body_size) {
            return Err(ApiError::PayloadTooLarge);
        }

        let bytes = axum::body::to_bytes(body, self.max_body_size)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Failed to read request body");
                ApiError::PayloadTooLarge
            })?;
        if bytes.is_empty() {
            return Err(ApiError::MissingBody);
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ApiError::MissingBody),
            Err(e) => {
                tracing::debug!(error = %e, "Request body is not valid JSON");
                Err(ApiError::MissingBody)
            }
        }
    }

    fn check_attachment(
        &self,
        form: FormKind,
        record: &Map<String, Value>,
        client: &str,
    ) -> Result<Option<ValidatedFile>, ApiError> {
        let upload = match record.get(RESUME_FIELD) {
            Some(upload) if form.accepts_resume() && !upload.is_null() => upload,
            _ => return Ok(None),
        };

        match check_resume(upload) {
            Ok(file) => {
                tracing::debug!(
                    filename = %file.filename,
                    size = file.size,
                    mime = file.mime(),
                    "Resume accepted"
                );
                Ok(Some(file))
            }
            Err(e) => {
                SecurityEvent::new(SecurityEventKind::FileRejected, client, form.route_key())
                    .detail("reason", e.to_string())
                    .emit();
                Err(ApiError::FileValidationFailed(e.to_field_errors()))
            }
        }
    }

    async fn send(
        &self,
        message: OutboundMessage,
        client: &str,
        route: &'static str,
    ) -> Result<MessageId, ApiError> {
        match timeouts::dispatch(self.mailer.as_ref(), message, self.dispatch_timeout).await {
            Ok(id) => {
                metrics::record_dispatch("success");
                Ok(id)
            }
            Err(e) => {
                let outcome = match e {
                    SendError::Timeout(_) => "timeout",
                    _ => "failure",
                };
                metrics::record_dispatch(outcome);
                tracing::error!(
                    client_ip = %client,
                    route,
                    mailer = self.mailer.name(),
                    error = %e,
                    "Mail dispatch failed"
                );
                Err(ApiError::DispatchFailed)
            }
        }
    }
}
