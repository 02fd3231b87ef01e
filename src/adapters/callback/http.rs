//! HTTP callback sender.
//!
//! POSTs the reply envelope to the caller-supplied callback URL.
//! One attempt, no retry: the channel invalidates the URL quickly, so
//! redelivery would only ever hit a dead endpoint.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::adapters::http::dto::ReplyEnvelope;
use crate::domain::screening::Reply;
use crate::ports::{CallbackError, CallbackSender};

pub struct HttpCallbackSender {
    client: Client,
}

impl HttpCallbackSender {
    pub fn new(client: Client) -> Self {
        HttpCallbackSender { client }
    }
}

#[async_trait]
impl CallbackSender for HttpCallbackSender {
    async fn deliver(&self, callback_url: &str, reply: &Reply) -> Result<(), CallbackError> {
        let envelope = ReplyEnvelope::from(reply);
        debug!(url = %callback_url, "delivering callback reply");
        let response = self
            .client
            .post(callback_url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| CallbackError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CallbackError::Delivery(format!(
                "callback endpoint returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
