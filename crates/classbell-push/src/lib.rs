//! # Classbell Push
//!
//! Best-effort push delivery to a recipient's registered device tokens.
//! One `send` call covers the full token set; callers treat any failure as
//! log-and-continue; there is no retry and no dead-letter.

pub mod http;

pub use http::HttpPush;

use async_trait::async_trait;
use classbell_core::Result;
use serde::{Deserialize, Serialize};

/// Display payload handed to the push collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Icon URL shown by the client.
    pub icon: String,
}

/// A push delivery transport.
#[async_trait]
pub trait PushTransport: Send + Sync {
    fn name(&self) -> &str;

    /// Attempt delivery of `message` to every token in one request.
    async fn send(&self, tokens: &[String], message: &PushMessage) -> Result<()>;
}

/// Records deliveries instead of sending them: the dry-run target and the
/// test transport. Keeps only the most recent 100 deliveries.
#[derive(Default)]
pub struct RecordingPush {
    sent: std::sync::Mutex<Vec<(Vec<String>, PushMessage)>>,
}

impl RecordingPush {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn sent(&self) -> Vec<(Vec<String>, PushMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushTransport for RecordingPush {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, tokens: &[String], message: &PushMessage) -> Result<()> {
        tracing::debug!(
            "Recorded push to {} token(s): {}",
            tokens.len(),
            message.title
        );
        let mut sent = self.sent.lock().unwrap();
        sent.push((tokens.to_vec(), message.clone()));
        if sent.len() > 100 {
            sent.remove(0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_push_records() {
        let push = RecordingPush::new();
        let message = PushMessage {
            title: "Fisika".into(),
            body: "tugas baru".into(),
            icon: "/icons/icon-192.png".into(),
        };
        push.send(&["tok-1".into(), "tok-2".into()], &message)
            .await
            .unwrap();

        let sent = push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.len(), 2);
        assert_eq!(sent[0].1, message);
    }

    #[tokio::test]
    async fn test_recording_push_ring_buffer() {
        let push = RecordingPush::new();
        let message = PushMessage {
            title: "t".into(),
            body: "b".into(),
            icon: "i".into(),
        };
        for _ in 0..105 {
            push.send(&["tok".into()], &message).await.unwrap();
        }
        assert_eq!(push.sent().len(), 100);
    }
}
