//! SQLite store adapter: single-file persistence behind `DocumentStore`.
//!
//! Array-valued fields are stored as JSON text columns; timestamps as
//! integer milliseconds since the epoch. Snapshot publication works the
//! same way as the in-memory adapter: subscribers get a full newest-first
//! snapshot after every notification write.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classbell_core::error::ClassbellError;
use classbell_core::Result;
use classbell_core::types::{
    ClassDoc, NotificationKind, NotificationRecord, TaskDoc, UserProfile,
};
use rusqlite::{Connection, params};

use crate::subscription::{NotificationStream, Subscriptions};
use crate::DocumentStore;

/// SQLite-backed `DocumentStore`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    subs: Subscriptions,
}

fn store_err(e: impl std::fmt::Display) -> ClassbellError {
    ClassbellError::Store(e.to_string())
}

fn to_json(values: &[String]) -> Result<String> {
    serde_json::to_string(values).map_err(store_err)
}

fn from_json(text: &str) -> Vec<String> {
    serde_json::from_str(text).unwrap_or_default()
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(store_err)?;
        let store = Self {
            conn: Mutex::new(conn),
            subs: Subscriptions::new(),
        };
        store.init()?;
        tracing::info!("Opened classbell store at {}", path.display());
        Ok(store)
    }

    /// Open a private in-memory database (used by tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        let store = Self {
            conn: Mutex::new(conn),
            subs: Subscriptions::new(),
        };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .lock()
            .unwrap()
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS classes (
                  id TEXT PRIMARY KEY,
                  subject TEXT NOT NULL,
                  day TEXT NOT NULL,
                  start_time TEXT NOT NULL,
                  room TEXT NOT NULL,
                  members TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS tasks (
                  id TEXT PRIMARY KEY,
                  class_id TEXT NOT NULL,
                  title TEXT NOT NULL,
                  due_ms INTEGER NOT NULL,
                  creator_id TEXT NOT NULL,
                  creator_name TEXT NOT NULL,
                  completed_by TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_tasks_due ON tasks (due_ms);

                CREATE TABLE IF NOT EXISTS users (
                  id TEXT PRIMARY KEY,
                  device_tokens TEXT NOT NULL,
                  joined_classes TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS notifications (
                  id TEXT PRIMARY KEY,
                  user_id TEXT NOT NULL,
                  message TEXT NOT NULL,
                  kind TEXT NOT NULL,
                  created_ms INTEGER NOT NULL,
                  read INTEGER NOT NULL DEFAULT 0
                );
                CREATE INDEX IF NOT EXISTS idx_notifications_user
                  ON notifications (user_id, created_ms DESC);
                "#,
            )
            .map_err(store_err)
    }

    fn snapshot(conn: &Connection, user_id: &str) -> Result<Vec<NotificationRecord>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, message, kind, created_ms, read FROM notifications
                 WHERE user_id = ?1 ORDER BY created_ms DESC, id DESC",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, bool>(4)?,
                ))
            })
            .map_err(store_err)?;

        let mut records = Vec::new();
        for row in rows {
            let (id, message, kind, created_ms, read) = row.map_err(store_err)?;
            let timestamp = DateTime::<Utc>::from_timestamp_millis(created_ms)
                .ok_or_else(|| store_err(format!("bad timestamp {created_ms} on {id}")))?;
            records.push(NotificationRecord {
                id,
                message,
                kind: NotificationKind::from_wire(&kind),
                timestamp,
                read,
            });
        }
        Ok(records)
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn class(&self, class_id: &str) -> Result<Option<ClassDoc>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT subject, day, start_time, room, members FROM classes WHERE id = ?1")
            .map_err(store_err)?;
        let mut rows = stmt
            .query_map(params![class_id], |row| {
                Ok(ClassDoc {
                    subject: row.get(0)?,
                    day: row.get(1)?,
                    start_time: row.get(2)?,
                    room: row.get(3)?,
                    members: from_json(&row.get::<_, String>(4)?),
                })
            })
            .map_err(store_err)?;
        rows.next().transpose().map_err(store_err)
    }

    async fn put_class(&self, class_id: &str, class: ClassDoc) -> Result<()> {
        self.conn
            .lock()
            .unwrap()
            .execute(
                "INSERT OR REPLACE INTO classes (id, subject, day, start_time, room, members)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    class_id,
                    class.subject,
                    class.day,
                    class.start_time,
                    class.room,
                    to_json(&class.members)?
                ],
            )
            .map_err(store_err)?;
        Ok(())
    }

    async fn classes_on_day(&self, day: &str) -> Result<Vec<(String, ClassDoc)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, subject, day, start_time, room, members FROM classes
                 WHERE day = ?1 COLLATE NOCASE",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map(params![day], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    ClassDoc {
                        subject: row.get(1)?,
                        day: row.get(2)?,
                        start_time: row.get(3)?,
                        room: row.get(4)?,
                        members: from_json(&row.get::<_, String>(5)?),
                    },
                ))
            })
            .map_err(store_err)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(store_err)
    }

    async fn put_task(&self, task_id: &str, task: TaskDoc) -> Result<()> {
        self.conn
            .lock()
            .unwrap()
            .execute(
                "INSERT OR REPLACE INTO tasks
                 (id, class_id, title, due_ms, creator_id, creator_name, completed_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    task_id,
                    task.class_id,
                    task.title,
                    task.due_date.timestamp_millis(),
                    task.creator_id,
                    task.creator_name,
                    to_json(&task.completed_by)?
                ],
            )
            .map_err(store_err)?;
        Ok(())
    }

    async fn tasks_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(String, TaskDoc)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, class_id, title, due_ms, creator_id, creator_name, completed_by
                 FROM tasks WHERE due_ms >= ?1 AND due_ms <= ?2",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map(
                params![from.timestamp_millis(), to.timestamp_millis()],
                |row| {
                    let due_ms: i64 = row.get(3)?;
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        due_ms,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .map_err(store_err)?;

        let mut tasks = Vec::new();
        for row in rows {
            let (id, class_id, title, due_ms, creator_id, creator_name, completed_by) =
                row.map_err(store_err)?;
            let due_date = DateTime::<Utc>::from_timestamp_millis(due_ms)
                .ok_or_else(|| store_err(format!("bad due timestamp {due_ms} on {id}")))?;
            tasks.push((
                id,
                TaskDoc {
                    title,
                    due_date,
                    creator_id,
                    creator_name,
                    completed_by: from_json(&completed_by),
                    class_id,
                },
            ));
        }
        Ok(tasks)
    }

    async fn user(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT device_tokens, joined_classes FROM users WHERE id = ?1")
            .map_err(store_err)?;
        let mut rows = stmt
            .query_map(params![user_id], |row| {
                Ok(UserProfile {
                    device_tokens: from_json(&row.get::<_, String>(0)?),
                    joined_classes: from_json(&row.get::<_, String>(1)?),
                })
            })
            .map_err(store_err)?;
        rows.next().transpose().map_err(store_err)
    }

    async fn put_user(&self, user_id: &str, profile: UserProfile) -> Result<()> {
        self.conn
            .lock()
            .unwrap()
            .execute(
                "INSERT OR REPLACE INTO users (id, device_tokens, joined_classes)
                 VALUES (?1, ?2, ?3)",
                params![
                    user_id,
                    to_json(&profile.device_tokens)?,
                    to_json(&profile.joined_classes)?
                ],
            )
            .map_err(store_err)?;
        Ok(())
    }

    async fn remove_joined_class(&self, user_id: &str, class_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let joined: Option<String> = conn
            .query_row(
                "SELECT joined_classes FROM users WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(store_err(other)),
            })?;
        let Some(joined) = joined else {
            return Ok(());
        };
        let mut classes = from_json(&joined);
        classes.retain(|c| c != class_id);
        conn.execute(
            "UPDATE users SET joined_classes = ?1 WHERE id = ?2",
            params![to_json(&classes)?, user_id],
        )
        .map_err(store_err)?;
        Ok(())
    }

    async fn append_notification(&self, user_id: &str, record: NotificationRecord) -> Result<()> {
        let snapshot = {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO notifications (id, user_id, message, kind, created_ms, read)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    user_id,
                    record.message,
                    record.kind.as_str(),
                    record.timestamp.timestamp_millis(),
                    record.read
                ],
            )
            .map_err(store_err)?;
            Self::snapshot(&conn, user_id)?
        };
        self.subs.publish(user_id, snapshot);
        Ok(())
    }

    async fn notifications(&self, user_id: &str) -> Result<Vec<NotificationRecord>> {
        Self::snapshot(&self.conn.lock().unwrap(), user_id)
    }

    async fn mark_read(&self, user_id: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let snapshot = {
            let mut conn = self.conn.lock().unwrap();
            let tx = conn.transaction().map_err(store_err)?;
            let mut changed = 0usize;
            for id in ids {
                changed += tx
                    .execute(
                        "UPDATE notifications SET read = 1
                         WHERE id = ?1 AND user_id = ?2 AND read = 0",
                        params![id, user_id],
                    )
                    .map_err(store_err)?;
            }
            tx.commit().map_err(store_err)?;
            if changed == 0 {
                return Ok(());
            }
            Self::snapshot(&conn, user_id)?
        };
        self.subs.publish(user_id, snapshot);
        Ok(())
    }

    async fn subscribe(&self, user_id: &str) -> Result<NotificationStream> {
        let initial = Self::snapshot(&self.conn.lock().unwrap(), user_id)?;
        Ok(self.subs.register(user_id, initial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use futures::StreamExt;

    fn record(message: &str, at: DateTime<Utc>) -> NotificationRecord {
        NotificationRecord::new(message, NotificationKind::DeadlineReminder, at)
    }

    #[tokio::test]
    async fn test_class_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let class = ClassDoc {
            subject: "Sejarah".into(),
            day: "Friday".into(),
            start_time: "10:30".into(),
            room: "C-12".into(),
            members: vec!["u1".into(), "u2".into()],
        };
        store.put_class("c1", class.clone()).await.unwrap();
        assert_eq!(store.class("c1").await.unwrap(), Some(class));
        assert_eq!(store.class("nope").await.unwrap(), None);
        assert_eq!(store.classes_on_day("friday").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_due_window_boundaries() {
        let store = SqliteStore::open_in_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 9, 0, 0).unwrap();
        let upper = now + Duration::hours(24);
        let task = |due: DateTime<Utc>| TaskDoc {
            title: "t".into(),
            due_date: due,
            creator_id: "u1".into(),
            creator_name: "U1".into(),
            completed_by: vec!["u2".into()],
            class_id: "c1".into(),
        };
        store.put_task("lower", task(now)).await.unwrap();
        store.put_task("upper", task(upper)).await.unwrap();
        store
            .put_task("outside", task(upper + Duration::milliseconds(1)))
            .await
            .unwrap();

        let hits = store.tasks_due_between(now, upper).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|(id, _)| id.as_str()).collect();
        assert!(ids.contains(&"lower"));
        assert!(ids.contains(&"upper"));
        assert!(!ids.contains(&"outside"));
        assert_eq!(hits[0].1.completed_by, vec!["u2".to_string()]);
    }

    #[tokio::test]
    async fn test_notifications_and_mark_read() {
        let store = SqliteStore::open_in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2026, 8, 5, 8, 0, 0).unwrap();
        store.append_notification("u1", record("a", base)).await.unwrap();
        store
            .append_notification("u1", record("b", base + Duration::minutes(1)))
            .await
            .unwrap();

        let records = store.notifications("u1").await.unwrap();
        assert_eq!(records[0].message, "b");
        assert_eq!(records[0].kind, NotificationKind::DeadlineReminder);

        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        store.mark_read("u1", &ids).await.unwrap();
        assert!(store.notifications("u1").await.unwrap().iter().all(|r| r.read));
    }

    #[tokio::test]
    async fn test_remove_joined_class() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .put_user(
                "u1",
                UserProfile {
                    device_tokens: vec!["tok".into()],
                    joined_classes: vec!["c1".into(), "c2".into()],
                },
            )
            .await
            .unwrap();
        store.remove_joined_class("u1", "c2").await.unwrap();
        store.remove_joined_class("u1", "c2").await.unwrap();
        store.remove_joined_class("ghost", "c2").await.unwrap();

        let profile = store.user("u1").await.unwrap().unwrap();
        assert_eq!(profile.joined_classes, vec!["c1".to_string()]);
        assert_eq!(profile.device_tokens, vec!["tok".to_string()]);
    }

    #[tokio::test]
    async fn test_subscription_publishes_after_append() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut stream = store.subscribe("u1").await.unwrap();
        assert!(stream.next().await.unwrap().is_empty());

        let base = Utc.with_ymd_and_hms(2026, 8, 5, 8, 0, 0).unwrap();
        store.append_notification("u1", record("hi", base)).await.unwrap();
        let snapshot = stream.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].message, "hi");
    }

    #[tokio::test]
    async fn test_unknown_kind_survives_storage() {
        let store = SqliteStore::open_in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2026, 8, 5, 8, 0, 0).unwrap();
        let mut rec = record("x", base);
        rec.kind = NotificationKind::Unknown;
        store.append_notification("u1", rec).await.unwrap();
        let records = store.notifications("u1").await.unwrap();
        assert_eq!(records[0].kind, NotificationKind::Unknown);
    }
}
