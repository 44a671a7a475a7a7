//! Request inspection helpers.
//!
//! # Responsibilities
//! - Derive the client identity used for rate limiting and audit events
//! - Recognize JSON content types
//! - Read the request id set by the request-id layer
//!
//! # Design Decisions
//! - Client IP is an ordered fallback: `X-Forwarded-For` (first hop),
//!   `X-Real-IP`, the socket address, then `"unknown"`. The headers are
//!   only trustworthy behind a proxy that overwrites them.

use std::net::SocketAddr;

use axum::http::{header, HeaderMap};

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Client id when nothing better is known.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Best-effort client address.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// `Content-Type` names JSON (parameters such as `charset` are allowed).
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|media_type| media_type.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Declared body length, when the client sent one.
pub fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}
