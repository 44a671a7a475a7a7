//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, route per form)
//!     → request.rs (client IP, content type, request ID)
//!     → submission pipeline
//!     → response.rs (ApiError / receipt → status + JSON body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{ApiError, SubmissionReceipt};
pub use server::{build_router, AppState, GatewayServer};
