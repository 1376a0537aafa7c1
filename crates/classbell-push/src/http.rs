//! HTTP push adapter: posts to an FCM legacy-style send endpoint.

use async_trait::async_trait;
use classbell_core::error::ClassbellError;
use classbell_core::Result;

use crate::{PushMessage, PushTransport};

/// Push transport that POSTs one JSON request per delivery, covering the
/// recipient's full token set.
pub struct HttpPush {
    endpoint: String,
    server_key: String,
    client: reqwest::Client,
}

impl HttpPush {
    pub fn new(endpoint: &str, server_key: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            server_key: server_key.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PushTransport for HttpPush {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, tokens: &[String], message: &PushMessage) -> Result<()> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&serde_json::json!({
                "registration_ids": tokens,
                "notification": {
                    "title": message.title,
                    "body": message.body,
                    "icon": message.icon,
                },
            }))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| ClassbellError::Push(format!("Push send failed: {e}")))?;

        if resp.status().is_success() {
            tracing::debug!(
                "Push sent to {} token(s): {}",
                tokens.len(),
                message.title
            );
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(ClassbellError::Push(format!(
                "Push endpoint error {status}: {body}"
            )))
        }
    }
}
