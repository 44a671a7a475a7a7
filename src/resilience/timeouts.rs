//! Timeout enforcement.
//!
//! # Responsibilities
//! - Put a deadline on every call to the mail provider
//! - Turn an elapsed deadline into a distinct `SendError::Timeout`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the send future is dropped on expiry
//! - A timed-out dispatch is never retried

use std::future::Future;
use std::time::Duration;

use crate::mail::{MailSender, MessageId, OutboundMessage, SendError};

/// Default deadline for one provider call.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `fut`, failing with `SendError::Timeout` once `limit` has elapsed.
pub async fn with_deadline<T, F>(limit: Duration, fut: F) -> Result<T, SendError>
where
    F: Future<Output = Result<T, SendError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(SendError::Timeout(limit)),
    }
}

/// Send one message through `sender` under `limit`.
pub async fn dispatch(
    sender: &dyn MailSender,
    message: OutboundMessage,
    limit: Duration,
) -> Result<MessageId, SendError> {
    with_deadline(limit, sender.send(message)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapses() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, SendError>(())
        };
        let result = with_deadline(DEFAULT_DISPATCH_TIMEOUT, slow).await;
        assert!(matches!(result, Err(SendError::Timeout(d)) if d == DEFAULT_DISPATCH_TIMEOUT));
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let result = with_deadline(Duration::from_secs(1), async { Ok::<_, SendError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
