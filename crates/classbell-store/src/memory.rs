//! In-memory store adapter: the substitutable test double, also used for
//! dry-run serving.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classbell_core::Result;
use classbell_core::types::{ClassDoc, NotificationRecord, TaskDoc, UserProfile};

use crate::subscription::{NotificationStream, Subscriptions};
use crate::DocumentStore;

#[derive(Default)]
struct Collections {
    classes: HashMap<String, ClassDoc>,
    tasks: HashMap<String, TaskDoc>,
    users: HashMap<String, UserProfile>,
    notifications: HashMap<String, Vec<NotificationRecord>>,
}

/// In-memory `DocumentStore`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
    subs: Subscriptions,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot for one user, newest first.
    fn snapshot(collections: &Collections, user_id: &str) -> Vec<NotificationRecord> {
        let mut records = collections
            .notifications
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        records
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn class(&self, class_id: &str) -> Result<Option<ClassDoc>> {
        Ok(self.inner.read().unwrap().classes.get(class_id).cloned())
    }

    async fn put_class(&self, class_id: &str, class: ClassDoc) -> Result<()> {
        self.inner
            .write()
            .unwrap()
            .classes
            .insert(class_id.to_string(), class);
        Ok(())
    }

    async fn classes_on_day(&self, day: &str) -> Result<Vec<(String, ClassDoc)>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .classes
            .iter()
            .filter(|(_, class)| class.day.eq_ignore_ascii_case(day))
            .map(|(id, class)| (id.clone(), class.clone()))
            .collect())
    }

    async fn put_task(&self, task_id: &str, task: TaskDoc) -> Result<()> {
        self.inner
            .write()
            .unwrap()
            .tasks
            .insert(task_id.to_string(), task);
        Ok(())
    }

    async fn tasks_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(String, TaskDoc)>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .tasks
            .iter()
            .filter(|(_, task)| task.due_date >= from && task.due_date <= to)
            .map(|(id, task)| (id.clone(), task.clone()))
            .collect())
    }

    async fn user(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.inner.read().unwrap().users.get(user_id).cloned())
    }

    async fn put_user(&self, user_id: &str, profile: UserProfile) -> Result<()> {
        self.inner
            .write()
            .unwrap()
            .users
            .insert(user_id.to_string(), profile);
        Ok(())
    }

    async fn remove_joined_class(&self, user_id: &str, class_id: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if let Some(profile) = inner.users.get_mut(user_id) {
            profile.joined_classes.retain(|c| c != class_id);
        }
        Ok(())
    }

    async fn append_notification(&self, user_id: &str, record: NotificationRecord) -> Result<()> {
        let snapshot = {
            let mut inner = self.inner.write().unwrap();
            inner
                .notifications
                .entry(user_id.to_string())
                .or_default()
                .push(record);
            Self::snapshot(&inner, user_id)
        };
        self.subs.publish(user_id, snapshot);
        Ok(())
    }

    async fn notifications(&self, user_id: &str) -> Result<Vec<NotificationRecord>> {
        Ok(Self::snapshot(&self.inner.read().unwrap(), user_id))
    }

    async fn mark_read(&self, user_id: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let snapshot = {
            let mut inner = self.inner.write().unwrap();
            let mut changed = false;
            if let Some(records) = inner.notifications.get_mut(user_id) {
                for record in records.iter_mut() {
                    if !record.read && ids.contains(&record.id) {
                        record.read = true;
                        changed = true;
                    }
                }
            }
            if !changed {
                return Ok(());
            }
            Self::snapshot(&inner, user_id)
        };
        self.subs.publish(user_id, snapshot);
        Ok(())
    }

    async fn subscribe(&self, user_id: &str) -> Result<NotificationStream> {
        let initial = Self::snapshot(&self.inner.read().unwrap(), user_id);
        Ok(self.subs.register(user_id, initial))
    }
}
