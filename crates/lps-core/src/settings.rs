//! Tunable constants of the engine.
//!
//! The session gap, the per-type base durations and the checkin threshold are
//! heuristics rather than measured values, so they are carried around as
//! settings instead of being baked into the algorithms.

use chrono::{FixedOffset, Offset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ItemType, grouping::GroupNameLocale};

/// Minutes attributed to a session made of a single attempt, per domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseMinutes {
    /// Lone word attempt
    pub word: i64,
    /// Lone dictation sentence
    pub sentence: i64,
    /// Lone shadowing line
    pub shadowing: i64,
}

impl BaseMinutes {
    /// Base duration of one domain
    pub const fn for_type(&self, item_type: ItemType) -> i64 {
        match item_type {
            ItemType::Word => self.word,
            ItemType::Sentence => self.sentence,
            ItemType::Shadowing => self.shadowing,
        }
    }
}

impl Default for BaseMinutes {
    fn default() -> Self {
        Self {
            word: 1,
            sentence: 2,
            shadowing: 3,
        }
    }
}

/// Every tunable of the engine, validated once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Largest gap between two attempts that still counts as one session
    pub session_gap_minutes: i64,
    /// Duration credited to lone attempts
    pub base_minutes: BaseMinutes,
    /// Study minutes required today before a checkin is accepted
    pub min_checkin_minutes: i64,
    /// Number of items per synthesized group
    pub bucket_size: usize,
    /// Language used when naming synthesized groups
    pub group_name_locale: GroupNameLocale,
    /// Offset of the learners' local calendar from UTC, in minutes
    pub utc_offset_minutes: i32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            session_gap_minutes: 5,
            base_minutes: BaseMinutes::default(),
            min_checkin_minutes: 10,
            bucket_size: 20,
            group_name_locale: GroupNameLocale::En,
            utc_offset_minutes: 8 * 60,
        }
    }
}

/// Reason a set of settings is unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("session gap must be a positive, representable duration, got {0} minutes")]
    SessionGap(i64),
    #[error("base minutes for {0} must be positive, got {1}")]
    BaseMinutes(ItemType, i64),
    #[error("minimum checkin minutes cannot be negative, got {0}")]
    MinCheckinMinutes(i64),
    #[error("group bucket size must be at least 1")]
    BucketSize,
    #[error("UTC offset of {0} minutes is out of range")]
    UtcOffset(i32),
}

impl EngineSettings {
    /// Check that every setting is usable by the algorithms.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.session_gap_minutes <= 0
            || TimeDelta::try_minutes(self.session_gap_minutes).is_none()
        {
            return Err(SettingsError::SessionGap(self.session_gap_minutes));
        }
        for item_type in ItemType::ALL {
            let minutes = self.base_minutes.for_type(item_type);
            if minutes <= 0 {
                return Err(SettingsError::BaseMinutes(item_type, minutes));
            }
        }
        if self.min_checkin_minutes < 0 {
            return Err(SettingsError::MinCheckinMinutes(self.min_checkin_minutes));
        }
        if self.bucket_size == 0 {
            return Err(SettingsError::BucketSize);
        }
        if FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).is_none() {
            return Err(SettingsError::UtcOffset(self.utc_offset_minutes));
        }
        Ok(())
    }

    /// The session gap as a duration, saturating for out-of-range values.
    pub fn session_gap(&self) -> TimeDelta {
        TimeDelta::try_minutes(self.session_gap_minutes).unwrap_or(TimeDelta::MAX)
    }

    /// The learners' local zone. Falls back to UTC for an invalid offset,
    /// which [`EngineSettings::validate`] rejects up front.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}
