//! Method, content-type, CORS and header behaviour of the HTTP surface.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use common::*;

fn request(method: &str, path: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(path)
        .header("x-forwarded-for", "203.0.113.50")
}

#[tokio::test]
async fn test_preflight_returns_204_with_cors() {
    let app = build_app(test_config(), &[], RecordingMailer::new());

    let response = send(
        &app,
        request("OPTIONS", "/api/apply")
            .header("origin", ALLOWED_ORIGIN)
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], ALLOWED_ORIGIN);
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn test_unlisted_origin_is_not_echoed() {
    let app = build_app(test_config(), &[], RecordingMailer::new());

    let response = send(
        &app,
        request("OPTIONS", "/api/contact")
            .header("origin", "https://www.acme.example.evil.test")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_other_methods_get_405() {
    let app = build_app(test_config(), &[], RecordingMailer::new());

    for method in ["GET", "PUT", "DELETE", "PATCH"] {
        let response = send(
            &app,
            request(method, "/api/contact")
                .header("origin", ALLOWED_ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        assert_eq!(response.headers()["access-control-allow-origin"], ALLOWED_ORIGIN);
        assert_eq!(body_json(response).await, json!({ "error": "Method not allowed" }));
    }
}

#[tokio::test]
async fn test_non_json_content_type_rejected() {
    let mailer = RecordingMailer::new();
    let app = build_app(test_config(), &[], mailer.clone());

    let response = send(
        &app,
        request("POST", "/api/contact")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("name=Jane&email=jane%40example.com"))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Content-Type must be application/json"
    );
    assert_eq!(mailer.count(), 0);
}

#[tokio::test]
async fn test_body_must_be_a_json_object() {
    let app = build_app(test_config(), &[], RecordingMailer::new());

    for payload in ["", "not json", "[1,2,3]", "\"text\""] {
        let response = send(
            &app,
            request("POST", "/api/pre-meeting")
                .header("content-type", "application/json")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload {:?}", payload);
        assert_eq!(body_json(response).await["error"], "Request body is required");
    }
}

#[tokio::test]
async fn test_oversized_body_gets_413() {
    let mut config = test_config();
    config.security.max_body_size = 1024;
    let app = build_app(config, &[], RecordingMailer::new());

    let body = json!({ "name": "Jane", "email": "jane@example.com", "message": "x".repeat(4096) });
    let response = send(&app, post_json("/api/contact", "203.0.113.51", &body)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = build_app(test_config(), &[], RecordingMailer::new());

    let body = json!({ "name": "Jane", "email": "jane@example.com", "message": "hello" });
    let response = send(&app, post_json("/api/contact", "203.0.113.52", &body)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["cache-control"], "no-store");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_app(test_config(), &["Rust Engineer"], RecordingMailer::new());

    let response = send(&app, request("GET", "/health").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("access-control-allow-origin").is_none());

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["openPositions"], 1);
}

#[tokio::test]
async fn test_live_server_uses_socket_address() {
    let mailer = RecordingMailer::new();
    let mut config = test_config();
    config.limits.contact.max_requests = 1;
    let (addr, shutdown) = start_gateway(config, mailer.clone()).await;

    let client = reqwest::Client::new();
    let url = format!("http://{}/api/contact", addr);
    let body = json!({ "name": "Jane", "email": "jane@example.com", "message": "hello" });

    let first = client.post(&url).json(&body).send().await.unwrap();
    assert_eq!(first.status().as_u16(), 200);

    // No proxy headers: the limiter keys on the peer address.
    let second = client.post(&url).json(&body).send().await.unwrap();
    assert_eq!(second.status().as_u16(), 429);
    assert_eq!(mailer.count(), 1);

    shutdown.trigger();
}
