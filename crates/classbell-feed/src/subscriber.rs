//! Live feed subscription: render every snapshot, then reconcile read state.

use std::sync::Arc;

use chrono::Utc;
use classbell_store::DocumentStore;
use futures::StreamExt;

use crate::render::{render_feed, FeedView, FEED_LOAD_FAILED_TEXT};

/// Receives rendered feed views. The client shell implements this.
pub trait FeedSink: Send {
    fn present(&mut self, view: FeedView);
}

impl<F: FnMut(FeedView) + Send> FeedSink for F {
    fn present(&mut self, view: FeedView) {
        self(view)
    }
}

/// Consumes a user's notification subscription.
///
/// For every snapshot: render the full list from scratch, hand it to the
/// sink, then submit one batched read-flag commit for every unread record
/// in that snapshot. A failed commit is logged and dropped; the records
/// stay unread, so the next snapshot retries naturally.
pub struct FeedSubscriber {
    store: Arc<dyn DocumentStore>,
    user_id: String,
}

impl FeedSubscriber {
    pub fn new(store: Arc<dyn DocumentStore>, user_id: &str) -> Self {
        Self {
            store,
            user_id: user_id.to_string(),
        }
    }

    /// Run until the subscription stream ends (navigation away or logout
    /// drops the stream; any in-flight commit simply completes).
    pub async fn run(&self, sink: &mut dyn FeedSink) {
        let mut snapshots = match self.store.subscribe(&self.user_id).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!("Feed subscription failed for {}: {e}", self.user_id);
                sink.present(FeedView::Empty {
                    placeholder: FEED_LOAD_FAILED_TEXT,
                });
                return;
            }
        };

        while let Some(records) = snapshots.next().await {
            sink.present(render_feed(&records, Utc::now()));

            let unread: Vec<String> = records
                .iter()
                .filter(|record| !record.read)
                .map(|record| record.id.clone())
                .collect();
            if unread.is_empty() {
                continue;
            }
            if let Err(e) = self.store.mark_read(&self.user_id, &unread).await {
                tracing::warn!("Failed to mark notifications as read: {e}");
            }
        }
        tracing::debug!("Feed subscription for {} ended", self.user_id);
    }
}
