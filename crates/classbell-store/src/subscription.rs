//! Live notification snapshot fan-out.
//!
//! Each subscriber holds the receiving half of an unbounded channel; the
//! store publishes a full, newest-first snapshot after every write that
//! touches the user's notification collection. Dropped receivers are pruned
//! on the next publish.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};

use classbell_core::types::NotificationRecord;
use futures::stream::Stream;
use tokio::sync::mpsc;

/// Stream of full notification snapshots for one user, newest first.
pub struct NotificationStream {
    rx: mpsc::UnboundedReceiver<Vec<NotificationRecord>>,
}

impl Stream for NotificationStream {
    type Item = Vec<NotificationRecord>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Unpin for NotificationStream {}

/// Per-user registry of live subscribers, shared by every store adapter.
#[derive(Default)]
pub(crate) struct Subscriptions {
    senders: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<Vec<NotificationRecord>>>>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber and seed it with the initial snapshot.
    pub fn register(&self, user_id: &str, initial: Vec<NotificationRecord>) -> NotificationStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(initial);
        self.senders
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .push(tx);
        NotificationStream { rx }
    }

    /// Push a fresh snapshot to every live subscriber of `user_id`.
    pub fn publish(&self, user_id: &str, snapshot: Vec<NotificationRecord>) {
        let mut senders = self.senders.lock().unwrap();
        if let Some(list) = senders.get_mut(user_id) {
            list.retain(|tx| tx.send(snapshot.clone()).is_ok());
            if list.is_empty() {
                tracing::debug!("Last feed subscriber for {user_id} dropped");
                senders.remove(user_id);
            }
        }
    }
}
