//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (origin allow-list on every form response)
//!     → rate_limit.rs (per-client, per-route quota)
//!     → headers.rs (nosniff / no-store / no framing on the way out)
//! ```
//!
//! # Design Decisions
//! - The rate-limit store sits behind a trait and is owned by the caller
//! - Limits are passed in per route; the gate hard-codes none
//! - Origins are compared exactly; there are no wildcards

pub mod cors;
pub mod headers;
pub mod rate_limit;

pub use cors::CorsPolicy;
pub use rate_limit::{
    Admission, MemoryRateLimitStore, RateLimitKey, RateLimitRecord, RateLimitStore, RequestGate,
};
