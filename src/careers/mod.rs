//! Careers subsystem.
//!
//! Holds the list of job titles currently accepting applications. The
//! application form is cross-checked against it so submissions for removed
//! or closed postings are rejected.

pub mod registry;

pub use registry::{JobRegistry, RegistryError};
