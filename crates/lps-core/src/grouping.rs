//! Partitioning item sets into groups and tallying per-group progress.
//!
//! A set is either curated into explicit groups by its author, or split by
//! the engine into fixed-size buckets the first time it is listed. Bucket
//! membership follows item `index` order and, once written, never changes:
//! items appended later land in new trailing buckets.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    str::FromStr,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Where a group came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "group_kind", rename_all = "snake_case"))]
pub enum GroupKind {
    /// Curated by the content author
    Explicit,
    /// Synthesized by the engine
    SizeBucket,
}

/// Identity of a group, independent of whether it has been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Authored group, persisted under `id`
    Explicit { id: Uuid },
    /// Engine bucket, `bucket_index` counting from 1 within the set
    SizeBucket { set_id: Uuid, bucket_index: u32 },
}

impl GroupKey {
    /// Kind of group this key identifies.
    pub const fn kind(&self) -> GroupKind {
        match self {
            Self::Explicit { .. } => GroupKind::Explicit,
            Self::SizeBucket { .. } => GroupKind::SizeBucket,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit { id } => write!(f, "explicit:{id}"),
            Self::SizeBucket {
                set_id,
                bucket_index,
            } => write!(f, "bucket:{set_id}:{bucket_index}"),
        }
    }
}

/// Language used for synthesized bucket names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupNameLocale {
    /// English
    #[default]
    En,
    /// Chinese
    Zh,
}

impl GroupNameLocale {
    /// Name of the `number`-th bucket (1-based).
    pub fn bucket_name(self, number: u32) -> String {
        match self {
            Self::En => format!("Group {number}"),
            Self::Zh => format!("第{number}组"),
        }
    }
}

/// Locale string that is neither `en` nor `zh`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown group name locale '{0}', expected 'en' or 'zh'")]
pub struct UnknownLocale(pub String);

impl FromStr for GroupNameLocale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "zh" => Ok(Self::Zh),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

/// How the groups of a set are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingStrategy {
    /// The author's groups are returned as-is
    Explicit,
    /// Buckets are synthesized for any ungrouped items
    SizeBuckets,
}

/// Explicit groups win as soon as one exists; the two kinds never mix.
pub fn choose_strategy(existing: &[GroupKind]) -> GroupingStrategy {
    if existing.contains(&GroupKind::Explicit) {
        GroupingStrategy::Explicit
    } else {
        GroupingStrategy::SizeBuckets
    }
}

/// An item not yet assigned to any group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UngroupedItem {
    pub id: Uuid,
    /// Position within the set
    pub index: i32,
}

/// A bucket about to be created, with its members in position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPlan {
    pub key: GroupKey,
    /// Display name in the configured locale
    pub name: String,
    /// Sort order, continuing after existing buckets
    pub order: i32,
    pub item_ids: Vec<Uuid>,
}

impl BucketPlan {
    /// `(item_id, group_index)` pairs, the index being 1-based.
    pub fn assignments(&self) -> impl Iterator<Item = (Uuid, i32)> + '_ {
        self.item_ids
            .iter()
            .zip(1..)
            .map(|(&item_id, position)| (item_id, position))
    }
}

/// Plan the buckets for every ungrouped item of a set.
///
/// `last_order` is the highest order among the set's existing buckets, if
/// any; new buckets continue the numbering after it. Items are taken in
/// `index` order (ties by id) and cut into runs of `bucket_size`.
pub fn plan_size_buckets(
    set_id: Uuid,
    last_order: Option<i32>,
    mut ungrouped: Vec<UngroupedItem>,
    bucket_size: usize,
    locale: GroupNameLocale,
) -> Vec<BucketPlan> {
    ungrouped.sort_by_key(|item| (item.index, item.id));
    let first_order = last_order.unwrap_or(0).max(0) + 1;

    ungrouped
        .chunks(bucket_size.max(1))
        .zip(first_order..)
        .map(|(chunk, order)| {
            let bucket_index = order.unsigned_abs();
            BucketPlan {
                key: GroupKey::SizeBucket {
                    set_id,
                    bucket_index,
                },
                name: locale.bucket_name(bucket_index),
                order,
                item_ids: chunk.iter().map(|item| item.id).collect(),
            }
        })
        .collect()
}

/// A learner's standing on one item of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ItemProgress {
    pub item_id: Uuid,
    /// `None` while the item is still ungrouped
    pub group_id: Option<Uuid>,
    /// At least one non-archived attempt that was correct or mastered
    pub completed: bool,
    /// Latest non-archived attempt
    pub last_attempt_at: Option<DateTime<Utc>>,
}

/// Completion of one group for one learner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupProgress {
    /// Items in the group
    pub total: u64,
    /// Items completed at least once
    pub done: u64,
    /// Latest non-archived attempt on any item of the group
    pub last_studied_at: Option<DateTime<Utc>>,
}

/// Tally item standings per group.
///
/// Items are counted once each however many rows mention them, so `done`
/// never exceeds `total`. Items without a group are skipped.
pub fn tally_progress(items: &[ItemProgress]) -> HashMap<Uuid, GroupProgress> {
    let mut seen = HashSet::new();
    let mut tally: HashMap<Uuid, GroupProgress> = HashMap::new();

    for item in items {
        let Some(group_id) = item.group_id else {
            continue;
        };
        if !seen.insert(item.item_id) {
            continue;
        }

        let progress = tally.entry(group_id).or_default();
        progress.total += 1;
        if item.completed {
            progress.done += 1;
        }
        progress.last_studied_at = progress.last_studied_at.max(item.last_attempt_at);
    }

    tally
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn items(count: u32) -> Vec<UngroupedItem> {
        (0..count)
            .map(|i| UngroupedItem {
                id: Uuid::from_u128(u128::from(i) + 1),
                index: i32::try_from(i).expect("small index"),
            })
            .collect()
    }

    #[test]
    fn test_choose_strategy() {
        assert_eq!(choose_strategy(&[]), GroupingStrategy::SizeBuckets);
        assert_eq!(
            choose_strategy(&[GroupKind::SizeBucket]),
            GroupingStrategy::SizeBuckets
        );
        assert_eq!(
            choose_strategy(&[GroupKind::Explicit]),
            GroupingStrategy::Explicit
        );
    }

    #[test]
    fn test_bucket_names() {
        assert_eq!(GroupNameLocale::En.bucket_name(3), "Group 3");
        assert_eq!(GroupNameLocale::Zh.bucket_name(3), "第3组");
        assert_eq!("ZH".parse::<GroupNameLocale>(), Ok(GroupNameLocale::Zh));
        assert!("fr".parse::<GroupNameLocale>().is_err());
    }

    #[test]
    fn test_plan_fixed_size_buckets() {
        let set_id = Uuid::new_v4();
        let plans = plan_size_buckets(set_id, None, items(45), 20, GroupNameLocale::En);

        assert_eq!(plans.len(), 3);
        assert_eq!(
            plans.iter().map(|p| p.item_ids.len()).collect::<Vec<_>>(),
            vec![20, 20, 5]
        );
        assert_eq!(plans[0].name, "Group 1");
        assert_eq!(plans[2].order, 3);
        assert_eq!(
            plans[1].key,
            GroupKey::SizeBucket {
                set_id,
                bucket_index: 2
            }
        );
        assert_eq!(plans[1].key.kind(), GroupKind::SizeBucket);

        let assignments: Vec<_> = plans[1].assignments().collect();
        assert_eq!(assignments.first(), Some(&(Uuid::from_u128(21), 1)));
        assert_eq!(assignments.last(), Some(&(Uuid::from_u128(40), 20)));
    }

    #[test]
    fn test_plan_follows_index_not_input_order() {
        let mut shuffled = items(5);
        shuffled.reverse();
        let plans = plan_size_buckets(Uuid::new_v4(), None, shuffled, 2, GroupNameLocale::En);
        assert_eq!(
            plans[0].item_ids,
            vec![Uuid::from_u128(1), Uuid::from_u128(2)]
        );
        assert_eq!(plans[2].item_ids, vec![Uuid::from_u128(5)]);
    }

    #[test]
    fn test_appended_items_get_trailing_buckets() {
        let set_id = Uuid::new_v4();
        let appended: Vec<_> = items(25).into_iter().skip(20).collect();
        let plans = plan_size_buckets(set_id, Some(2), appended, 20, GroupNameLocale::Zh);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].order, 3);
        assert_eq!(plans[0].name, "第3组");
        assert_eq!(plans[0].item_ids.len(), 5);
    }

    #[test]
    fn test_nothing_to_plan() {
        let plans = plan_size_buckets(Uuid::new_v4(), Some(4), Vec::new(), 20, GroupNameLocale::En);
        assert!(plans.is_empty());
    }

    #[test]
    fn test_tally_counts_distinct_items() {
        let group = Uuid::new_v4();
        let other = Uuid::new_v4();
        let now = Utc::now();
        let item = |n: u128, group_id, completed, last| ItemProgress {
            item_id: Uuid::from_u128(n),
            group_id,
            completed,
            last_attempt_at: last,
        };

        let rows = [
            item(1, Some(group), true, Some(now - TimeDelta::hours(2))),
            item(1, Some(group), true, Some(now - TimeDelta::hours(2))),
            item(2, Some(group), false, Some(now)),
            item(3, Some(group), false, None),
            item(4, Some(other), true, None),
            item(5, None, true, Some(now)),
        ];
        let tally = tally_progress(&rows);

        let progress = tally[&group];
        assert_eq!(progress.total, 3);
        assert_eq!(progress.done, 1);
        assert_eq!(progress.last_studied_at, Some(now));
        assert!(progress.done <= progress.total);

        assert_eq!(tally[&other].done, 1);
        assert_eq!(tally[&other].last_studied_at, None);
        assert_eq!(tally.len(), 2);
    }
}
