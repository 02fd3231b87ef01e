//! Callback Sender Port - Interface for delivering deferred replies.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::screening::Reply;

/// Errors that can occur during callback delivery
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("callback delivery failed: {0}")]
    Delivery(String),
}

/// Port for pushing a finished reply to the caller-supplied channel.
///
/// Delivery is single-attempt. A failure is surfaced to the caller for
/// logging only; the channel offers no redelivery, so the user simply
/// never sees that reply.
#[async_trait]
pub trait CallbackSender: Send + Sync {
    async fn deliver(&self, callback_url: &str, reply: &Reply) -> Result<(), CallbackError>;
}
