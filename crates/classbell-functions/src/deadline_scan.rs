//! Deadline reminder scan.
//!
//! Runs hourly: every task due inside `[now, now + lookahead]` (inclusive
//! on both ends) produces reminders for the class members who have not
//! completed it. Consecutive runs can match the same task again; there is
//! no cross-run deduplication.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use classbell_core::types::PushContent;
use classbell_core::Result;
use classbell_store::DocumentStore;

use crate::deliver::Deliverer;

/// Run one scan. Returns the number of reminders delivered.
pub async fn run_deadline_scan(
    store: &Arc<dyn DocumentStore>,
    deliverer: &Deliverer,
    now: DateTime<Utc>,
    lookahead_hours: i64,
) -> Result<usize> {
    let until = now + Duration::hours(lookahead_hours);
    let due = store.tasks_due_between(now, until).await?;
    tracing::debug!("Deadline scan found {} task(s) due before {until}", due.len());

    let mut delivered = 0usize;
    for (task_id, task) in due {
        let class = match store.class(&task.class_id).await {
            Ok(Some(class)) => class,
            Ok(None) => {
                tracing::warn!("Task {task_id} references missing class {}", task.class_id);
                continue;
            }
            Err(e) => {
                tracing::error!("Class lookup failed for task {task_id}: {e}");
                continue;
            }
        };

        let recipients: Vec<String> = class
            .members
            .iter()
            .filter(|member| !task.completed_by.contains(member))
            .cloned()
            .collect();
        if recipients.is_empty() {
            continue;
        }

        let content = PushContent::DeadlineReminder {
            class_subject: class.subject.clone(),
            task_title: task.title.clone(),
        };
        deliverer.deliver_all(&recipients, &content).await;
        delivered += recipients.len();
    }
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use classbell_core::types::{ClassDoc, NotificationKind, TaskDoc};
    use classbell_push::RecordingPush;
    use classbell_store::MemoryStore;

    fn class(members: &[&str]) -> ClassDoc {
        ClassDoc {
            subject: "Kimia".into(),
            day: "Tuesday".into(),
            start_time: "09:00".into(),
            room: "B-2".into(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn task(due: DateTime<Utc>, completed_by: &[&str]) -> TaskDoc {
        TaskDoc {
            title: "Laporan".into(),
            due_date: due,
            creator_id: "teacher".into(),
            creator_name: "Bu Sari".into(),
            completed_by: completed_by.iter().map(|m| m.to_string()).collect(),
            class_id: "c1".into(),
        }
    }

    async fn setup() -> (Arc<dyn DocumentStore>, Deliverer) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        store.put_class("c1", class(&["a", "b", "c"])).await.unwrap();
        let deliverer = Deliverer::new(store.clone(), Arc::new(RecordingPush::new()), "/icon.png");
        (store, deliverer)
    }

    #[tokio::test]
    async fn test_window_boundaries() {
        let (store, deliverer) = setup().await;
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 9, 0, 0).unwrap();

        store.put_task("at-lower", task(now, &[])).await.unwrap();
        store
            .put_task("at-upper", task(now + Duration::hours(24), &[]))
            .await
            .unwrap();
        store
            .put_task(
                "outside",
                task(now + Duration::hours(24) + Duration::milliseconds(1), &[]),
            )
            .await
            .unwrap();

        let delivered = run_deadline_scan(&store, &deliverer, now, 24).await.unwrap();
        // Two in-window tasks, three members each.
        assert_eq!(delivered, 6);
        assert_eq!(store.notifications("a").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_completed_members_are_skipped() {
        let (store, deliverer) = setup().await;
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 9, 0, 0).unwrap();
        store
            .put_task("t1", task(now + Duration::hours(2), &["a", "c"]))
            .await
            .unwrap();

        let delivered = run_deadline_scan(&store, &deliverer, now, 24).await.unwrap();
        assert_eq!(delivered, 1);
        assert!(store.notifications("a").await.unwrap().is_empty());
        assert!(store.notifications("c").await.unwrap().is_empty());

        let records = store.notifications("b").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, NotificationKind::DeadlineReminder);
        assert!(records[0].message.contains("Laporan"));
    }

    #[tokio::test]
    async fn test_task_due_in_the_past_is_ignored() {
        let (store, deliverer) = setup().await;
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 9, 0, 0).unwrap();
        store
            .put_task("overdue", task(now - Duration::minutes(1), &[]))
            .await
            .unwrap();

        let delivered = run_deadline_scan(&store, &deliverer, now, 24).await.unwrap();
        assert_eq!(delivered, 0);
    }
}
