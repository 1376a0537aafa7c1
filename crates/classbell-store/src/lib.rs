//! # Classbell Store
//!
//! Port onto the document-store collaborator: hierarchical collections
//! (`classes/{id}`, `classes/{id}/tasks/{id}`, `users/{id}/notifications/{id}`),
//! equality and collection-group range queries, idempotent array element
//! removal, a batched read-flag update, and live per-user notification
//! subscriptions.
//!
//! Handlers receive the store as an injected `Arc<dyn DocumentStore>` so any
//! adapter (or a test double) can stand in; there is no global client.

pub mod memory;
pub mod sqlite;
pub mod subscription;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use subscription::NotificationStream;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classbell_core::Result;
use classbell_core::types::{ClassDoc, NotificationRecord, TaskDoc, UserProfile};

/// Async port onto the backing document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn class(&self, class_id: &str) -> Result<Option<ClassDoc>>;

    async fn put_class(&self, class_id: &str, class: ClassDoc) -> Result<()>;

    /// Equality query: every class meeting on `day` (weekday name,
    /// case-insensitive), as `(class_id, doc)` pairs.
    async fn classes_on_day(&self, day: &str) -> Result<Vec<(String, ClassDoc)>>;

    async fn put_task(&self, task_id: &str, task: TaskDoc) -> Result<()>;

    /// Collection-group range query over all tasks regardless of owning
    /// class. Both bounds are inclusive.
    async fn tasks_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(String, TaskDoc)>>;

    async fn user(&self, user_id: &str) -> Result<Option<UserProfile>>;

    async fn put_user(&self, user_id: &str, profile: UserProfile) -> Result<()>;

    /// Atomic array element removal from the user's `joined_classes`.
    /// Idempotent: a missing user or an absent element is not an error.
    async fn remove_joined_class(&self, user_id: &str, class_id: &str) -> Result<()>;

    /// Append one record to the recipient's notification collection.
    async fn append_notification(&self, user_id: &str, record: NotificationRecord) -> Result<()>;

    /// All of a user's notifications, newest first.
    async fn notifications(&self, user_id: &str) -> Result<Vec<NotificationRecord>>;

    /// One batched update flipping every listed record to read.
    async fn mark_read(&self, user_id: &str, ids: &[String]) -> Result<()>;

    /// Live feed: an initial full snapshot, then a new full snapshot after
    /// every notification append or read-state commit for this user. The
    /// subscription ends when the stream is dropped.
    async fn subscribe(&self, user_id: &str) -> Result<NotificationStream>;
}
