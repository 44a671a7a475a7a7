//! Form submission gateway library.
//!
//! Validation and anti-abuse pipeline for a website's contact, job
//! application and pre-meeting forms: rate limiting, field sanitization,
//! resume signature checks and HTML-safe email composition.

// Core subsystems
pub mod config;
pub mod http;
pub mod submission;
pub mod validation;

// Collaborators
pub mod careers;
pub mod mail;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
