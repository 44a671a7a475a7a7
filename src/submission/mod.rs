//! Form submission subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP request for a form route
//!     → pipeline.rs (state machine, first failure wins)
//!         → validation (fields, resume)
//!         → compose.rs + templates.rs (escaped HTML messages)
//!         → mail sender under a deadline
//!     → SubmissionReceipt | ApiError
//! ```
//!
//! # Design Decisions
//! - forms.rs is the only place that knows which form does what
//! - Contact and pre-meeting forms never auto-reply

pub mod compose;
pub mod forms;
pub mod pipeline;
pub mod templates;

pub use compose::{escape_html, ComposedMessages, MessageComposer};
pub use forms::FormKind;
pub use pipeline::{Outcome, SubmissionPipeline};
