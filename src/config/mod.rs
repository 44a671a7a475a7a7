//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! Positions file changes:
//!     watcher.rs detects change
//!     → careers registry re-reads the file
//!     → atomic swap of the open-titles snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the job registry hot-reloads
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CareersConfig, CorsConfig, GatewayConfig, LimitsConfig, ListenerConfig, LogFormat,
    MailConfig, MailProvider, ObservabilityConfig, RouteLimit, SecurityConfig,
};
