//! Input validation subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed JSON object
//!     → fields.rs (rule table interpreted field by field, all errors collected)
//!     → file.rs (resume upload: encoding, size, MIME, magic bytes)
//!     → SanitizedRecord + optional ValidatedFile
//! ```
//!
//! # Design Decisions
//! - Rule tables live in rules.rs as `const` data, one per form
//! - Validation is pure; the clock and open positions are passed in
//! - Nothing here knows about HTTP

pub mod fields;
pub mod file;
pub mod rules;

pub use fields::{
    validate, FieldErrors, FieldKind, FieldRule, Presence, SanitizedRecord, ValidationContext,
    ValidationResult,
};
pub use file::{check_resume, DocumentKind, FileCheckError, ValidatedFile};
