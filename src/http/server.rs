//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: one route per form, plus `/health`
//! - Wire up middleware (tracing, request ID, timeout, CORS, security headers)
//! - Bind the server to a listener with connection info for client IPs
//! - Record per-submission metrics

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{HeaderName, Request},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::careers::JobRegistry;
use crate::config::GatewayConfig;
use crate::http::request::X_REQUEST_ID;
use crate::mail::MailSender;
use crate::observability::metrics;
use crate::security::{cors::cors_middleware, headers::with_security_headers, CorsPolicy, RequestGate};
use crate::submission::{FormKind, SubmissionPipeline};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SubmissionPipeline>,
    pub registry: Arc<JobRegistry>,
}

/// HTTP server for the form endpoints.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server with a fresh in-memory rate limiter.
    pub fn new(
        config: GatewayConfig,
        registry: Arc<JobRegistry>,
        mailer: Arc<dyn MailSender>,
    ) -> Self {
        let gate = RequestGate::new(
            Arc::new(crate::security::MemoryRateLimitStore::new()),
            config.limits.sweep_threshold,
        );
        Self::with_gate(config, gate, registry, mailer)
    }

    /// Create a server around an existing rate limiter.
    pub fn with_gate(
        config: GatewayConfig,
        gate: RequestGate,
        registry: Arc<JobRegistry>,
        mailer: Arc<dyn MailSender>,
    ) -> Self {
        let pipeline = Arc::new(SubmissionPipeline::new(&config, gate, registry.clone(), mailer));
        let state = AppState { pipeline, registry };
        let router = build_router(&config, state);
        Self { router, config }
    }

    /// The fully layered router (used directly by in-process tests).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
    let cors = Arc::new(CorsPolicy::from_config(&config.cors));
    let request_id = HeaderName::from_static(X_REQUEST_ID);

    let forms = Router::new()
        .route(FormKind::Contact.path(), any(contact_handler))
        .route(FormKind::Application.path(), any(apply_handler))
        .route(FormKind::PreMeeting.path(), any(pre_meeting_handler))
        .layer(middleware::from_fn_with_state(cors, cors_middleware))
        .layer(DefaultBodyLimit::max(config.security.max_body_size));

    let router = Router::new()
        .merge(forms)
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.security.request_timeout_secs,
        )))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid));

    with_security_headers(router)
}

async fn contact_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    submit(&state, FormKind::Contact, request).await
}

async fn apply_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    submit(&state, FormKind::Application, request).await
}

async fn pre_meeting_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    submit(&state, FormKind::PreMeeting, request).await
}

async fn submit(state: &AppState, form: FormKind, request: Request<Body>) -> Response {
    let start = Instant::now();
    let response = match state.pipeline.handle(form, request).await {
        Ok(outcome) => outcome.into_response(),
        Err(e) => e.into_response(),
    };
    metrics::record_submission(form.route_key(), response.status().as_u16(), start);
    response
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "openPositions": state.registry.snapshot().len(),
        "rateLimitRecords": state.pipeline.gate().records(),
    }))
}
