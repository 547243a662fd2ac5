use chrono::{DateTime, NaiveDate, Utc};
use lps_core::{
    ItemType,
    grouping::{GroupKey, GroupKind},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Content set - an ordered collection of items of one domain
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ItemSet {
    /// Unique set identifier
    pub id: Uuid,
    /// URL-friendly unique name
    pub slug: String,
    /// Display title
    pub title: String,
    /// Domain of every item in the set
    pub item_type: ItemType,
}

/// Group of items inside a set, curated or synthesized
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ItemGroup {
    /// Unique group identifier
    pub id: Uuid,
    /// Set owning the group
    pub set_id: Uuid,
    /// Display name
    pub name: String,
    /// Whether the group was curated or synthesized
    pub kind: GroupKind,
    /// Position among the set's groups (1-based for buckets)
    pub sort_order: i32,
    /// When the group was created
    pub created_at: DateTime<Utc>,
}

impl ItemGroup {
    pub fn key(&self) -> GroupKey {
        match self.kind {
            GroupKind::Explicit => GroupKey::Explicit { id: self.id },
            GroupKind::SizeBucket => GroupKey::SizeBucket {
                set_id: self.set_id,
                bucket_index: self.sort_order.unsigned_abs(),
            },
        }
    }
}

/// Word, dictation sentence or shadowing line
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    /// Unique item identifier
    pub id: Uuid,
    /// Set the item belongs to
    pub set_id: Uuid,
    /// Practice domain
    pub item_type: ItemType,
    /// Position inside the set
    #[sqlx(rename = "idx")]
    pub index: i32,
    /// Displayed text
    pub text: String,
    /// Text used for deduplication
    pub normalized_text: String,
    /// Group assignment, if any
    pub group_id: Option<Uuid>,
    /// 1-based position inside the group
    pub group_index: Option<i32>,
}

/// One practice submission, as appended to `attempt_events`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptEventInsert {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub item_type: ItemType,
    pub occurred_at: DateTime<Utc>,
    pub correct: bool,
}

/// Daily checkin, unique on (user_id, checkin_date)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CheckinRecord {
    pub user_id: Uuid,
    /// Local calendar day of the checkin
    pub checkin_date: NaiveDate,
    /// Study minutes the user had that day when checking in
    pub minutes_at_checkin: i32,
    pub created_at: DateTime<Utc>,
}

/// Filters for attempt queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttemptQuery {
    pub user_id: Uuid,
    /// Inclusive lower bound on `occurred_at`
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `occurred_at`
    pub end: Option<DateTime<Utc>>,
    pub item_type: Option<ItemType>,
    pub correct: Option<bool>,
    pub include_archived: bool,
}

impl AttemptQuery {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    pub const fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}
