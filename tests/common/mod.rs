//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use base64::Engine;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use submission_gateway::careers::JobRegistry;
use submission_gateway::config::GatewayConfig;
use submission_gateway::mail::{MailSender, MessageId, OutboundMessage, SendError};
use submission_gateway::{GatewayServer, Shutdown};

pub const ALLOWED_ORIGIN: &str = "https://www.acme.example";

/// Mail sender that keeps every message it is given.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send(&self, message: OutboundMessage) -> Result<MessageId, SendError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(message);
        Ok(MessageId(format!("msg-{}", sent.len())))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Mail sender whose provider always refuses.
pub struct FailingMailer;

#[async_trait]
impl MailSender for FailingMailer {
    async fn send(&self, _message: OutboundMessage) -> Result<MessageId, SendError> {
        Err(SendError::Rejected {
            status: 422,
            body: "invalid from address".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Mail sender that delivers the first message and refuses the rest.
#[derive(Default)]
pub struct FlakyMailer {
    sent: Mutex<Vec<OutboundMessage>>,
    attempts: AtomicUsize,
}

impl FlakyMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MailSender for FlakyMailer {
    async fn send(&self, message: OutboundMessage) -> Result<MessageId, SendError> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) > 0 {
            return Err(SendError::Rejected {
                status: 503,
                body: "provider unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message);
        Ok(MessageId("msg-1".to_string()))
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

/// Mail sender that never answers.
pub struct StalledMailer;

#[async_trait]
impl MailSender for StalledMailer {
    async fn send(&self, _message: OutboundMessage) -> Result<MessageId, SendError> {
        std::future::pending().await
    }

    fn name(&self) -> &'static str {
        "stalled"
    }
}

pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.cors.allowed_origins = vec![ALLOWED_ORIGIN.to_string()];
    config.mail.from = "Acme Website <noreply@acme.example>".to_string();
    config.mail.operator_address = "team@acme.example".to_string();
    config
}

pub fn build_app(
    config: GatewayConfig,
    open_positions: &[&str],
    mailer: Arc<dyn MailSender>,
) -> Router {
    let registry = Arc::new(JobRegistry::new(
        open_positions.iter().map(|t| t.to_string()).collect(),
    ));
    GatewayServer::new(config, registry, mailer).router()
}

/// A JSON POST from `client_ip` with an allowed origin.
pub fn post_json(path: &str, client_ip: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("origin", ALLOWED_ORIGIN)
        .header("x-forwarded-for", client_ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

pub fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Serve a gateway on an ephemeral port. Trigger the returned handle to stop it.
pub async fn start_gateway(
    config: GatewayConfig,
    mailer: Arc<dyn MailSender>,
) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config, Arc::new(JobRegistry::default()), mailer);
    let wait = shutdown.wait();
    tokio::spawn(async move {
        let _ = server.run(listener, wait).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}
