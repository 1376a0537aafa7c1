//! Domain types: the documents and payloads the fan-out pipeline moves.
//!
//! Field names serialize in the document store's camelCase convention so
//! records written by this service and by the companion app stay
//! interchangeable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A class document (`classes/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassDoc {
    /// Subject name, e.g. "Matematika".
    pub subject: String,
    /// Weekday the class meets, e.g. "Monday".
    pub day: String,
    /// Start time as "HH:MM" on the local clock.
    pub start_time: String,
    /// Room label.
    pub room: String,
    /// Member user ids. Mutated externally by join/kick operations.
    pub members: Vec<String>,
}

/// A task document (`classes/{classId}/tasks/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDoc {
    pub title: String,
    /// Due instant.
    pub due_date: DateTime<Utc>,
    pub creator_id: String,
    pub creator_name: String,
    /// Ids of members who already completed the task.
    #[serde(default)]
    pub completed_by: Vec<String>,
    /// Owning class reference.
    pub class_id: String,
}

/// A user's delivery profile (`users/{id}`).
///
/// `device_tokens` is read-only from this service's perspective;
/// `joined_classes` is mutated only by membership cleanup (element removal).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub device_tokens: Vec<String>,
    #[serde(default)]
    pub joined_classes: Vec<String>,
}

/// Wire-visible notification type tag.
///
/// Stored as a string field; unrecognized tags land in `Unknown` so old
/// clients keep rendering feeds written by newer servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    #[serde(rename = "NEW_TASK")]
    NewTask,
    #[serde(rename = "DEADLINE_REMINDER")]
    DeadlineReminder,
    #[serde(rename = "CLASS_STARTING")]
    ClassStarting,
    #[serde(rename = "UNKNOWN", other)]
    Unknown,
}

impl NotificationKind {
    /// The stored wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewTask => "NEW_TASK",
            Self::DeadlineReminder => "DEADLINE_REMINDER",
            Self::ClassStarting => "CLASS_STARTING",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse a stored wire string; anything unrecognized is `Unknown`.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "NEW_TASK" => Self::NewTask,
            "DEADLINE_REMINDER" => Self::DeadlineReminder,
            "CLASS_STARTING" => Self::ClassStarting,
            _ => Self::Unknown,
        }
    }
}

/// One in-app notification record (`users/{id}/notifications/{id}`).
///
/// Append-only; the only mutation this service ever performs is flipping
/// `read` from false to true, and never back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl NotificationRecord {
    /// Build a fresh unread record.
    pub fn new(message: impl Into<String>, kind: NotificationKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            kind,
            timestamp,
            read: false,
        }
    }
}

/// Display payload for one notification event. A closed set of variants,
/// one per kind, each carrying exactly the fields its rendering and
/// dispatch need.
#[derive(Debug, Clone, PartialEq)]
pub enum PushContent {
    NewTask {
        class_subject: String,
        creator_name: String,
        task_title: String,
    },
    DeadlineReminder {
        class_subject: String,
        task_title: String,
    },
    ClassStarting {
        class_subject: String,
        room: String,
    },
}

impl PushContent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::NewTask { .. } => NotificationKind::NewTask,
            Self::DeadlineReminder { .. } => NotificationKind::DeadlineReminder,
            Self::ClassStarting { .. } => NotificationKind::ClassStarting,
        }
    }

    /// Push title: always the class subject.
    pub fn title(&self) -> &str {
        match self {
            Self::NewTask { class_subject, .. }
            | Self::DeadlineReminder { class_subject, .. }
            | Self::ClassStarting { class_subject, .. } => class_subject,
        }
    }

    /// Push body. Doubles as the stored in-app message text.
    pub fn body(&self) -> String {
        match self {
            Self::NewTask {
                creator_name,
                task_title,
                ..
            } => format!("{creator_name} menambahkan tugas baru: \"{task_title}\""),
            Self::DeadlineReminder {
                class_subject,
                task_title,
            } => format!("Tugas \"{task_title}\" ({class_subject}) akan segera berakhir"),
            Self::ClassStarting {
                class_subject,
                room,
            } => format!("Kelas {class_subject} akan segera dimulai di ruang {room}"),
        }
    }

    /// Build the in-app record for this payload.
    pub fn to_record(&self, timestamp: DateTime<Utc>) -> NotificationRecord {
        NotificationRecord::new(self.body(), self.kind(), timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kind_wire_roundtrip() {
        for kind in [
            NotificationKind::NewTask,
            NotificationKind::DeadlineReminder,
            NotificationKind::ClassStarting,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            let back: NotificationKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_unknown_kind_bucket() {
        let parsed: NotificationKind = serde_json::from_str("\"GRADE_POSTED\"").unwrap();
        assert_eq!(parsed, NotificationKind::Unknown);
        assert_eq!(NotificationKind::from_wire("whatever"), NotificationKind::Unknown);
    }

    #[test]
    fn test_record_serializes_type_field() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 10, 0, 0).unwrap();
        let record = NotificationRecord::new("halo", NotificationKind::NewTask, now);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "NEW_TASK");
        assert_eq!(json["read"], false);
    }

    #[test]
    fn test_push_content_title_and_kind() {
        let content = PushContent::NewTask {
            class_subject: "Fisika".into(),
            creator_name: "Budi".into(),
            task_title: "Bab 3".into(),
        };
        assert_eq!(content.title(), "Fisika");
        assert_eq!(content.kind(), NotificationKind::NewTask);
        assert!(content.body().contains("Budi"));
        assert!(content.body().contains("Bab 3"));
    }

    #[test]
    fn test_to_record_is_unread() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 10, 0, 0).unwrap();
        let content = PushContent::ClassStarting {
            class_subject: "Kimia".into(),
            room: "B-204".into(),
        };
        let record = content.to_record(now);
        assert!(!record.read);
        assert_eq!(record.kind, NotificationKind::ClassStarting);
        assert_eq!(record.timestamp, now);
        assert!(record.message.contains("B-204"));
    }

    #[test]
    fn test_profile_camel_case_fields() {
        let json = serde_json::json!({
            "deviceTokens": ["tok-1"],
            "joinedClasses": ["class-a"],
        });
        let profile: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.device_tokens, vec!["tok-1"]);
        assert_eq!(profile.joined_classes, vec!["class-a"]);
    }
}
