//! Outbound mail subsystem.
//!
//! # Data Flow
//! ```text
//! OutboundMessage (composed by the submission pipeline)
//!     → MailSender::send
//!         → resend.rs (HTTP provider API)
//!         → log.rs (development: log and return a generated id)
//!     → MessageId | SendError
//! ```
//!
//! # Design Decisions
//! - Senders are trait objects chosen once at startup from `mail.provider`
//! - Messages are handed over by value; the sender owns them
//! - No retries here; the caller decides what a failure means

pub mod log;
pub mod resend;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{MailConfig, MailProvider};

pub use self::log::LogMailer;
pub use resend::ResendMailer;

/// A file attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// One email, ready to hand to a [`MailSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    /// HTML body; all user-supplied text is already escaped.
    pub html: String,
    pub attachments: Vec<Attachment>,
}

/// Provider-assigned message id.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mail delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("mail provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("mail dispatch timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("unexpected mail provider response: {0}")]
    InvalidResponse(String),

    #[error("mail provider not configured: {0}")]
    NotConfigured(String),
}

/// Capability to deliver one message.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<MessageId, SendError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Build the sender selected by `config.provider`.
pub fn sender_from_config(config: &MailConfig) -> Result<Arc<dyn MailSender>, SendError> {
    match config.provider {
        MailProvider::Resend => {
            let api_key = config.resolved_api_key().ok_or_else(|| {
                SendError::NotConfigured(format!(
                    "no API key (set mail.api_key or {})",
                    MailConfig::API_KEY_ENV
                ))
            })?;
            let mailer = ResendMailer::new(&config.api_url, api_key, config.timeout())?;
            tracing::info!(api_url = %config.api_url, "Mail provider: resend");
            Ok(Arc::new(mailer))
        }
        MailProvider::Log => {
            tracing::warn!("Mail provider: log (messages are not delivered)");
            Ok(Arc::new(LogMailer::new()))
        }
    }
}
