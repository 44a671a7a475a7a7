//! Response mapping.
//!
//! # Responsibilities
//! - Map every pipeline failure to its status code and JSON body
//! - Serialize successful submissions
//! - Add `Retry-After` to rate-limit rejections
//!
//! # Design Decisions
//! - Internal error detail never reaches the client; 500s are generic
//! - Field error maps are withheld when a submission looks like spam

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::mail::MessageId;
use crate::validation::FieldErrors;

/// Every way a submission can be turned away.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Content-Type must be application/json")]
    UnsupportedContentType,

    #[error("Too many requests")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request body is required")]
    MissingBody,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Validation failed")]
    FieldValidationFailed { errors: FieldErrors, spam: bool },

    #[error("Invalid file upload")]
    FileValidationFailed(FieldErrors),

    #[error("Failed to send message. Please try again later.")]
    DispatchFailed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnsupportedContentType
            | Self::MissingBody
            | Self::FieldValidationFailed { .. }
            | Self::FileValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::DispatchFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.to_string();

        match self {
            Self::RateLimited { retry_after_secs } => {
                let body = json!({
                    "error": error,
                    "message": format!(
                        "Rate limit exceeded. Please try again in {retry_after_secs} seconds."
                    ),
                    "retryAfter": retry_after_secs,
                });
                let mut response = (status, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
            Self::FieldValidationFailed { spam: true, .. } => {
                (status, Json(json!({ "error": "Invalid submission" }))).into_response()
            }
            Self::FieldValidationFailed { errors, .. } | Self::FileValidationFailed(errors) => {
                (status, Json(json!({ "error": error, "errors": errors }))).into_response()
            }
            _ => (status, Json(json!({ "error": error }))).into_response(),
        }
    }
}

/// Body of a 200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub message: &'static str,
    pub notification_id: MessageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_id: Option<MessageId>,
}

impl IntoResponse for SubmissionReceipt {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_shape() {
        let response = ApiError::RateLimited { retry_after_secs: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");

        let body = body_json(response).await;
        assert_eq!(body["retryAfter"], 42);
        assert_eq!(body["error"], "Too many requests");
    }

    #[tokio::test]
    async fn test_spam_withholds_errors() {
        let errors = FieldErrors::from([("website".to_string(), "x".to_string())]);
        let response = ApiError::FieldValidationFailed { errors, spam: true }.into_response();
        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": "Invalid submission" }));
    }

    #[tokio::test]
    async fn test_file_error_shape() {
        let errors = FieldErrors::from([("resume".to_string(), "bad".to_string())]);
        let body = body_json(ApiError::FileValidationFailed(errors).into_response()).await;
        assert_eq!(body["error"], "Invalid file upload");
        assert_eq!(body["errors"]["resume"], "bad");
    }

    #[test]
    fn test_receipt_serialization() {
        let receipt = SubmissionReceipt {
            message: "Message sent successfully",
            notification_id: MessageId("abc".into()),
            confirmation_id: None,
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json, json!({ "message": "Message sent successfully", "notificationId": "abc" }));
    }
}
