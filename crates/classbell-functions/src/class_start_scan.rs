//! Class-start reminder scan.
//!
//! Runs every ten minutes on the deployment's local wall clock: classes
//! meeting today whose start instant falls inside `[now, now + lookahead]`
//! (inclusive on both ends) notify every member. No actor caused this
//! event, so nobody is excluded.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use classbell_core::types::{ClassDoc, PushContent};
use classbell_core::Result;
use classbell_store::DocumentStore;

use crate::deliver::Deliverer;

/// Whether `class` starts inside the lookahead window from `now`.
/// `start_time` values that fail to parse as "HH:MM" never match.
pub fn class_starts_within(class: &ClassDoc, now: NaiveDateTime, lookahead_mins: i64) -> bool {
    if !class.day.eq_ignore_ascii_case(&now.format("%A").to_string()) {
        return false;
    }
    let Ok(start_time) = NaiveTime::parse_from_str(&class.start_time, "%H:%M") else {
        tracing::warn!(
            "Unparseable start time \"{}\" for class {}",
            class.start_time,
            class.subject
        );
        return false;
    };
    let start = now.date().and_time(start_time);
    start >= now && start <= now + Duration::minutes(lookahead_mins)
}

/// Run one scan at local wall-clock `now`. Returns the number of reminders
/// delivered.
pub async fn run_class_start_scan(
    store: &Arc<dyn DocumentStore>,
    deliverer: &Deliverer,
    now: NaiveDateTime,
    lookahead_mins: i64,
) -> Result<usize> {
    let today = now.format("%A").to_string();
    let classes = store.classes_on_day(&today).await?;
    tracing::debug!("Class-start scan: {} class(es) meet on {today}", classes.len());

    let mut delivered = 0usize;
    for (_class_id, class) in classes {
        if !class_starts_within(&class, now, lookahead_mins) {
            continue;
        }
        if class.members.is_empty() {
            continue;
        }
        let content = PushContent::ClassStarting {
            class_subject: class.subject.clone(),
            room: class.room.clone(),
        };
        tracing::info!(
            "Class {} starts at {} in room {}",
            class.subject,
            class.start_time,
            class.room
        );
        deliverer.deliver_all(&class.members, &content).await;
        delivered += class.members.len();
    }
    Ok(delivered)
}
