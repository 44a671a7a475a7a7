//! Development mail sender that only logs.

use async_trait::async_trait;
use uuid::Uuid;

use super::{MailSender, MessageId, OutboundMessage, SendError};

/// Logs a summary of each message and returns a fresh UUID as its id.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailSender for LogMailer {
    async fn send(&self, message: OutboundMessage) -> Result<MessageId, SendError> {
        let id = Uuid::new_v4().to_string();
        tracing::info!(
            message_id = %id,
            to = ?message.to,
            subject = %message.subject,
            html_bytes = message.html.len(),
            attachments = message.attachments.len(),
            "Mail not delivered (log provider)"
        );
        Ok(MessageId(id))
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_unique() {
        let mailer = LogMailer::new();
        let msg = OutboundMessage {
            from: "a@example.com".into(),
            to: vec!["b@example.com".into()],
            reply_to: None,
            subject: "s".into(),
            html: String::new(),
            attachments: Vec::new(),
        };
        let a = mailer.send(msg.clone()).await.unwrap();
        let b = mailer.send(msg).await.unwrap();
        assert_ne!(a, b);
    }
}
