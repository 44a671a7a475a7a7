//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Composed message:
//!     → timeouts.rs (deadline around the provider call)
//!     → Ok(id) or SendError::Timeout / provider error
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Submissions are not idempotent, so nothing is retried

pub mod timeouts;

pub use timeouts::{dispatch, with_deadline, DEFAULT_DISPATCH_TIMEOUT};
