//! Pure feed rendering: snapshot in, view out.
//!
//! The rendered list is always rebuilt from scratch; styles derive purely
//! from each record's type tag, with a fallback style for tags this client
//! does not know.

use chrono::{DateTime, Datelike, Utc};
use classbell_core::types::{NotificationKind, NotificationRecord};

/// Placeholder shown for an empty collection.
pub const EMPTY_FEED_TEXT: &str = "Anda belum memiliki notifikasi.";
/// Placeholder shown when the subscription could not be established.
pub const FEED_LOAD_FAILED_TEXT: &str = "Gagal memuat notifikasi. Silakan coba lagi.";

/// Icon name plus color pair for one notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconStyle {
    pub icon: &'static str,
    pub background: &'static str,
    pub color: &'static str,
}

/// Fixed kind-to-style mapping; unknown kinds get the fallback style.
pub fn icon_style(kind: NotificationKind) -> IconStyle {
    match kind {
        NotificationKind::NewTask => IconStyle {
            icon: "ri-task-line",
            background: "#E0F2FE",
            color: "#0EA5E9",
        },
        NotificationKind::DeadlineReminder => IconStyle {
            icon: "ri-time-line",
            background: "#FEF3C7",
            color: "#F59E0B",
        },
        NotificationKind::ClassStarting => IconStyle {
            icon: "ri-vidicon-line",
            background: "#ECFDF5",
            color: "#10B981",
        },
        NotificationKind::Unknown => IconStyle {
            icon: "ri-notification-3-line",
            background: "#F3F2FF",
            color: "#6F6CFF",
        },
    }
}

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Humanize a timestamp relative to `now`. Every threshold rounds rather
/// than truncates; anything a day or older renders as an absolute date.
pub fn relative_timestamp(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = ((now - at).num_milliseconds() as f64 / 1000.0).round() as i64;
    if seconds < 60 {
        return format!("{seconds} detik yang lalu");
    }
    let minutes = (seconds as f64 / 60.0).round() as i64;
    if minutes < 60 {
        return format!("{minutes} menit yang lalu");
    }
    let hours = (minutes as f64 / 60.0).round() as i64;
    if hours < 24 {
        return format!("{hours} jam yang lalu");
    }
    format!(
        "{} {} {}",
        at.day(),
        MONTHS_ID[at.month0() as usize],
        at.year()
    )
}

/// One rendered feed entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub id: String,
    pub message: String,
    pub kind: NotificationKind,
    pub style: IconStyle,
    pub timestamp_label: String,
    pub unread: bool,
}

/// A full render pass result.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedView {
    /// Nothing to show; carries the placeholder text.
    Empty { placeholder: &'static str },
    /// The full list, newest first.
    Items(Vec<FeedItem>),
}

/// Render a snapshot. The input is expected newest-first, as the store
/// delivers it; ordering is preserved as-is.
pub fn render_feed(records: &[NotificationRecord], now: DateTime<Utc>) -> FeedView {
    if records.is_empty() {
        return FeedView::Empty {
            placeholder: EMPTY_FEED_TEXT,
        };
    }
    FeedView::Items(
        records
            .iter()
            .map(|record| FeedItem {
                id: record.id.clone(),
                message: record.message.clone(),
                kind: record.kind,
                style: icon_style(record.kind),
                timestamp_label: relative_timestamp(record.timestamp, now),
                unread: !record.read,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(now: DateTime<Utc>, ago: Duration) -> DateTime<Utc> {
        now - ago
    }

    #[test]
    fn test_relative_seconds_and_rounding_into_minutes() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();
        assert_eq!(
            relative_timestamp(at(now, Duration::seconds(5)), now),
            "5 detik yang lalu"
        );
        // 89 s rounds to 1 minute, 90 s to 2.
        assert_eq!(
            relative_timestamp(at(now, Duration::seconds(89)), now),
            "1 menit yang lalu"
        );
        assert_eq!(
            relative_timestamp(at(now, Duration::seconds(90)), now),
            "2 menit yang lalu"
        );
    }

    #[test]
    fn test_relative_hours_and_absolute_date() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();
        assert_eq!(
            relative_timestamp(at(now, Duration::hours(3)), now),
            "3 jam yang lalu"
        );
        // 23 h 40 m rounds to 24 h, which tips into the absolute date.
        assert_eq!(
            relative_timestamp(at(now, Duration::minutes(23 * 60 + 40)), now),
            "4 Agustus 2026"
        );
        assert_eq!(
            relative_timestamp(at(now, Duration::days(30)), now),
            "6 Juli 2026"
        );
    }

    #[test]
    fn test_styles_per_kind_with_fallback() {
        assert_eq!(icon_style(NotificationKind::NewTask).icon, "ri-task-line");
        assert_eq!(icon_style(NotificationKind::DeadlineReminder).icon, "ri-time-line");
        assert_eq!(icon_style(NotificationKind::ClassStarting).icon, "ri-vidicon-line");
        let fallback = icon_style(NotificationKind::Unknown);
        assert_eq!(fallback.icon, "ri-notification-3-line");
        assert_eq!(fallback.color, "#6F6CFF");
    }

    #[test]
    fn test_empty_snapshot_renders_placeholder() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();
        assert_eq!(
            render_feed(&[], now),
            FeedView::Empty {
                placeholder: EMPTY_FEED_TEXT
            }
        );
    }

    #[test]
    fn test_render_marks_unread() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();
        let mut read = NotificationRecord::new("a", NotificationKind::NewTask, now);
        read.read = true;
        let unread = NotificationRecord::new("b", NotificationKind::Unknown, now);

        let FeedView::Items(items) = render_feed(&[read, unread], now) else {
            panic!("expected items");
        };
        assert!(!items[0].unread);
        assert!(items[1].unread);
        assert_eq!(items[1].style, icon_style(NotificationKind::Unknown));
    }
}
