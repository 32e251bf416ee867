//! Recency bucketing of sessions for the history sidebar.
//!
//! A pure function over the store's read view; it holds no state and
//! always emits all four buckets, leaving it to the consumer to skip
//! empty ones.

use super::model::ChatSession;
use chrono::{DateTime, Days, Local};

const WEEK_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Display bucket for a session's last modification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyBucket {
    /// Same calendar day as now.
    Today,
    /// Exactly one calendar day before now.
    Yesterday,
    /// Within the last seven days, not already classified above.
    PreviousWeek,
    /// Everything else.
    Older,
}

impl RecencyBucket {
    /// Label shown as the bucket header.
    pub fn label(&self) -> &'static str {
        match self {
            RecencyBucket::Today => "Today",
            RecencyBucket::Yesterday => "Yesterday",
            RecencyBucket::PreviousWeek => "Previous 7 Days",
            RecencyBucket::Older => "Older",
        }
    }
}

/// Sessions partitioned by recency, each bucket most recent first.
#[derive(Debug, Default)]
pub struct GroupedSessions<'a> {
    pub today: Vec<&'a ChatSession>,
    pub yesterday: Vec<&'a ChatSession>,
    pub previous_week: Vec<&'a ChatSession>,
    pub older: Vec<&'a ChatSession>,
}

impl<'a> GroupedSessions<'a> {
    /// All buckets in display order, including empty ones.
    pub fn buckets(&self) -> [(RecencyBucket, &[&'a ChatSession]); 4] {
        [
            (RecencyBucket::Today, self.today.as_slice()),
            (RecencyBucket::Yesterday, self.yesterday.as_slice()),
            (RecencyBucket::PreviousWeek, self.previous_week.as_slice()),
            (RecencyBucket::Older, self.older.as_slice()),
        ]
    }

    /// Total number of sessions across all buckets.
    pub fn len(&self) -> usize {
        self.today.len() + self.yesterday.len() + self.previous_week.len() + self.older.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partitions sessions into recency buckets relative to `now`.
///
/// Today and Yesterday use calendar-day comparison in the local time
/// zone; Previous 7 Days is a rolling `now - 7*24h` window for what is
/// left; the rest is Older. Within each bucket sessions are sorted by
/// `last_modified` descending.
pub fn group_by_recency<'a>(
    sessions: &'a [ChatSession],
    now: DateTime<Local>,
) -> GroupedSessions<'a> {
    let today = now.date_naive();
    let yesterday = today - Days::new(1);
    let week_cutoff = now.timestamp_millis() - WEEK_MILLIS;

    let mut groups = GroupedSessions::default();
    for session in sessions {
        let modified = DateTime::from_timestamp_millis(session.last_modified)
            .map(|t| t.with_timezone(&Local));
        let bucket = match modified {
            Some(t) if t.date_naive() == today => &mut groups.today,
            Some(t) if t.date_naive() == yesterday => &mut groups.yesterday,
            Some(_) if session.last_modified > week_cutoff => &mut groups.previous_week,
            _ => &mut groups.older,
        };
        bucket.push(session);
    }

    for bucket in [
        &mut groups.today,
        &mut groups.yesterday,
        &mut groups.previous_week,
        &mut groups.older,
    ] {
        bucket.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    }

    groups
}
