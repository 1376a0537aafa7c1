//! Delivery orchestrator: in-app record first, push second.

use std::sync::Arc;

use chrono::Utc;
use classbell_core::types::PushContent;
use classbell_push::{PushMessage, PushTransport};
use classbell_store::DocumentStore;

/// Composes the notification write and the push dispatch for one recipient,
/// enforcing write-before-push ordering with independent failure handling.
///
/// `deliver` never reports an error to its caller: a failed record write
/// aborts that recipient's delivery (push skipped), a failed profile lookup
/// counts as "no tokens", and a failed push is logged and dropped.
#[derive(Clone)]
pub struct Deliverer {
    store: Arc<dyn DocumentStore>,
    push: Arc<dyn PushTransport>,
    icon_url: String,
}

impl Deliverer {
    pub fn new(store: Arc<dyn DocumentStore>, push: Arc<dyn PushTransport>, icon_url: &str) -> Self {
        Self {
            store,
            push,
            icon_url: icon_url.to_string(),
        }
    }

    /// Deliver one notification to one recipient. Fire-and-forget.
    pub async fn deliver(&self, recipient_id: &str, content: &PushContent) {
        let record = content.to_record(Utc::now());
        if let Err(e) = self.store.append_notification(recipient_id, record).await {
            tracing::error!("Failed to write notification for {recipient_id}: {e}");
            return;
        }

        let tokens = match self.store.user(recipient_id).await {
            Ok(Some(profile)) => profile.device_tokens,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Profile lookup failed for {recipient_id}, skipping push: {e}");
                Vec::new()
            }
        };
        if tokens.is_empty() {
            return;
        }

        let message = PushMessage {
            title: content.title().to_string(),
            body: content.body(),
            icon: self.icon_url.clone(),
        };
        if let Err(e) = self.push.send(&tokens, &message).await {
            tracing::warn!("Push delivery failed for {recipient_id}: {e}");
        }
    }

    /// Deliver to every recipient concurrently; completes when all
    /// per-recipient deliveries have settled.
    pub async fn deliver_all(&self, recipients: &[String], content: &PushContent) {
        let deliveries = recipients.iter().map(|r| self.deliver(r, content));
        futures::future::join_all(deliveries).await;
    }
}
