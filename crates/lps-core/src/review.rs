//! Review backlog selection.
//!
//! The backlog of a learner is every item they answered wrong at least once
//! and have not mastered since, ignoring archived attempts. The store hands
//! us one [`BacklogEntry`] per such item; this module orders, deduplicates
//! and pages them.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ItemType;

/// Largest page a backlog listing may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One missed, not yet mastered item of a learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogEntry {
    pub item_id: Uuid,
    pub set_id: Uuid,
    pub item_type: ItemType,
    pub text: String,
    pub normalized_text: String,
    /// Most recent wrong, non-archived attempt
    pub last_missed_at: DateTime<Utc>,
    /// Lifetime count of wrong, non-archived attempts
    pub wrong_count: i64,
}

impl BacklogEntry {
    /// Key two entries must share to be considered the same word.
    pub fn dedup_key(&self) -> String {
        let key = normalize_text(&self.normalized_text);
        if key.is_empty() {
            normalize_text(&self.text)
        } else {
            key
        }
    }
}

/// Normalization applied before comparing item texts.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_string()
}

/// Sort a backlog most recently missed first and drop duplicates.
///
/// Ties on the timestamp are broken by item id so the order is stable across
/// calls. Words sharing a normalized text collapse onto their most recently
/// missed occurrence; other domains only collapse repeated ids.
pub fn order_backlog(mut entries: Vec<BacklogEntry>, item_type: ItemType) -> Vec<BacklogEntry> {
    entries.sort_by(|a, b| {
        b.last_missed_at
            .cmp(&a.last_missed_at)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });

    let mut seen_ids = HashSet::new();
    let mut seen_texts = HashSet::new();
    entries.retain(|entry| {
        if !seen_ids.insert(entry.item_id) {
            return false;
        }
        !item_type.dedupes_by_text() || seen_texts.insert(entry.dedup_key())
    });

    entries
}

/// One page of an ordered backlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogPage {
    pub items: Vec<BacklogEntry>,
    /// Entries across all pages
    pub total: u64,
    /// More entries follow this page
    pub has_more: bool,
}

/// Slice an already ordered backlog.
pub fn paginate(ordered: Vec<BacklogEntry>, offset: u64, limit: u32) -> BacklogPage {
    let total = ordered.len() as u64;
    let start = usize::try_from(offset).unwrap_or(usize::MAX);
    let items: Vec<_> = ordered
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();
    let has_more = offset.saturating_add(items.len() as u64) < total;

    BacklogPage {
        items,
        total,
        has_more,
    }
}

/// Outcome of asking for the next item to review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextReview {
    /// Oldest miss not yet shown
    Item(BacklogEntry),
    /// Nothing left that has not been shown in this sitting
    Completed,
}

/// First entry of an ordered backlog whose id was not already shown.
pub fn next_review(ordered: &[BacklogEntry], exclude: &HashSet<Uuid>) -> NextReview {
    ordered
        .iter()
        .find(|entry| !exclude.contains(&entry.item_id))
        .cloned()
        .map_or(NextReview::Completed, NextReview::Item)
}

/// Per-item aggregate of a learner's attempts, joined with the catalog.
///
/// The store groups attempt rows by item; eligibility is decided here.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BacklogCandidate {
    pub item_id: Uuid,
    pub set_id: Uuid,
    pub item_type: ItemType,
    pub text: String,
    pub normalized_text: String,
    /// Wrong, non-archived attempts
    pub wrong_count: i64,
    /// Most recent wrong, non-archived attempt
    pub last_missed_at: Option<DateTime<Utc>>,
    /// A non-archived attempt row of the pair carries the mastered flag
    pub mastered: bool,
}

impl BacklogCandidate {
    /// Missed at least once, and not mastered since.
    pub const fn is_eligible(&self) -> bool {
        self.wrong_count > 0 && self.last_missed_at.is_some() && !self.mastered
    }

    /// The backlog entry, or `None` when the item is not eligible.
    pub fn into_entry(self) -> Option<BacklogEntry> {
        if !self.is_eligible() {
            return None;
        }
        Some(BacklogEntry {
            item_id: self.item_id,
            set_id: self.set_id,
            item_type: self.item_type,
            text: self.text,
            normalized_text: self.normalized_text,
            last_missed_at: self.last_missed_at?,
            wrong_count: self.wrong_count,
        })
    }
}

/// Filter candidates down to the ordered, deduplicated backlog of a domain.
///
/// Candidates of other domains are ignored.
pub fn build_backlog(candidates: Vec<BacklogCandidate>, item_type: ItemType) -> Vec<BacklogEntry> {
    let entries = candidates
        .into_iter()
        .filter(|candidate| candidate.item_type == item_type)
        .filter_map(BacklogCandidate::into_entry)
        .collect();
    order_backlog(entries, item_type)
}
