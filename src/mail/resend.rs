//! HTTP mail provider client.
//!
//! # Responsibilities
//! - POST each message to `{api_url}/emails` with a bearer key
//! - Base64-encode attachments into the JSON payload
//! - Map non-2xx responses to `SendError::Rejected`

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{MailSender, MessageId, OutboundMessage, SendError};

/// Client for a Resend-compatible `/emails` API.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct AttachmentPayload<'a> {
    filename: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct EmailResponse {
    id: String,
}

impl ResendMailer {
    pub fn new(api_url: &str, api_key: String, timeout: Duration) -> Result<Self, SendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/emails", api_url.trim_end_matches('/')),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn payload(message: &OutboundMessage) -> EmailPayload<'_> {
    EmailPayload {
        from: &message.from,
        to: &message.to,
        subject: &message.subject,
        html: &message.html,
        reply_to: message.reply_to.as_deref(),
        attachments: message
            .attachments
            .iter()
            .map(|a| AttachmentPayload {
                filename: &a.filename,
                content: base64::engine::general_purpose::STANDARD.encode(&a.content),
            })
            .collect(),
    }
}

#[async_trait]
impl MailSender for ResendMailer {
    async fn send(&self, message: OutboundMessage) -> Result<MessageId, SendError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload(&message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmailResponse = response
            .json()
            .await
            .map_err(|e| SendError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            message_id = %parsed.id,
            recipients = message.to.len(),
            "Message accepted by provider"
        );
        Ok(MessageId(parsed.id))
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}
