//! Task-creation fan-out.
//!
//! Fires once per new `classes/{classId}/tasks/{taskId}` document and
//! notifies every class member except the creator.

use std::sync::Arc;

use classbell_core::types::{PushContent, TaskDoc};
use classbell_store::DocumentStore;

use crate::deliver::Deliverer;

/// Handle a newly created task document.
pub async fn on_task_created(
    deliverer: &Deliverer,
    store: &Arc<dyn DocumentStore>,
    task_id: &str,
    task: &TaskDoc,
) {
    let class = match store.class(&task.class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            tracing::warn!("Task {task_id} references missing class {}", task.class_id);
            return;
        }
        Err(e) => {
            tracing::error!("Class lookup failed for task {task_id}: {e}");
            return;
        }
    };

    let recipients: Vec<String> = class
        .members
        .iter()
        .filter(|member| **member != task.creator_id)
        .cloned()
        .collect();
    if recipients.is_empty() {
        tracing::debug!("Task {task_id} has no recipients besides the creator");
        return;
    }

    let content = PushContent::NewTask {
        class_subject: class.subject.clone(),
        creator_name: task.creator_name.clone(),
        task_title: task.title.clone(),
    };
    tracing::info!(
        "New task \"{}\" in {}: notifying {} member(s)",
        task.title,
        class.subject,
        recipients.len()
    );
    deliverer.deliver_all(&recipients, &content).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use classbell_core::types::{ClassDoc, NotificationKind};
    use classbell_push::RecordingPush;
    use classbell_store::MemoryStore;

    fn task(creator: &str) -> TaskDoc {
        TaskDoc {
            title: "Latihan 5".into(),
            due_date: Utc::now() + Duration::days(3),
            creator_id: creator.into(),
            creator_name: "Budi".into(),
            completed_by: vec![],
            class_id: "c1".into(),
        }
    }

    async fn setup(members: &[&str]) -> (Deliverer, Arc<dyn DocumentStore>) {
        let store = Arc::new(MemoryStore::new());
        store
            .put_class(
                "c1",
                ClassDoc {
                    subject: "Matematika".into(),
                    day: "Monday".into(),
                    start_time: "08:00".into(),
                    room: "A-1".into(),
                    members: members.iter().map(|m| m.to_string()).collect(),
                },
            )
            .await
            .unwrap();
        let store: Arc<dyn DocumentStore> = store;
        let deliverer = Deliverer::new(store.clone(), Arc::new(RecordingPush::new()), "/icon.png");
        (deliverer, store)
    }

    #[tokio::test]
    async fn test_creator_is_never_notified() {
        let (deliverer, store) = setup(&["a", "b", "c"]).await;
        on_task_created(&deliverer, &store, "t1", &task("a")).await;

        assert!(store.notifications("a").await.unwrap().is_empty());
        for member in ["b", "c"] {
            let records = store.notifications(member).await.unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].kind, NotificationKind::NewTask);
            assert!(records[0].message.contains("Budi"));
            assert!(records[0].message.contains("Latihan 5"));
        }
    }

    #[tokio::test]
    async fn test_creator_outside_class_notifies_everyone() {
        let (deliverer, store) = setup(&["a", "b"]).await;
        on_task_created(&deliverer, &store, "t1", &task("teacher")).await;

        for member in ["a", "b"] {
            assert_eq!(store.notifications(member).await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_missing_class_is_a_no_op() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let deliverer = Deliverer::new(store.clone(), Arc::new(RecordingPush::new()), "/icon.png");

        let mut orphan = task("a");
        orphan.class_id = "ghost".into();
        on_task_created(&deliverer, &store, "t1", &orphan).await;

        assert!(store.notifications("a").await.unwrap().is_empty());
    }
}
