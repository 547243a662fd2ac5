//! Study session aggregation.
//!
//! Attempts only tell us *when* a learner submitted something, not how long
//! they were engaged. We infer engagement by chaining attempts into sessions:
//! any two consecutive attempts at most `session_gap` apart belong to the
//! same session. A session with several attempts is credited its observed
//! wall-clock span (at least one minute); a lone attempt is credited the
//! fixed base duration of its domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineSettings, ItemType};

/// The two facts about an attempt that session aggregation looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StudyEvent {
    /// Submission time of the attempt
    pub occurred_at: DateTime<Utc>,
    pub item_type: ItemType,
}

impl StudyEvent {
    /// Event of the given domain at `occurred_at`.
    pub const fn new(occurred_at: DateTime<Utc>, item_type: ItemType) -> Self {
        Self {
            occurred_at,
            item_type,
        }
    }
}

/// A run of attempts with no gap larger than the session gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySession {
    /// First attempt of the run
    pub started_at: DateTime<Utc>,
    /// Last attempt of the run
    pub ended_at: DateTime<Utc>,
    pub event_count: usize,
    /// Domain of the first attempt, used for the base duration of lone attempts
    pub first_type: ItemType,
}

impl StudySession {
    fn open(event: &StudyEvent) -> Self {
        Self {
            started_at: event.occurred_at,
            ended_at: event.occurred_at,
            event_count: 1,
            first_type: event.item_type,
        }
    }

    /// Minutes credited to this session.
    pub fn minutes(&self, settings: &EngineSettings) -> i64 {
        if self.event_count == 1 {
            return settings.base_minutes.for_type(self.first_type);
        }

        let span_minutes = (self.ended_at - self.started_at).num_milliseconds() as f64 / 60_000.0;
        (span_minutes.round() as i64).max(1)
    }
}

/// Raw attempt counts per domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    pub word: u64,
    pub sentence: u64,
    pub shadowing: u64,
}

impl TypeCounts {
    /// Count of one domain.
    pub const fn get(&self, item_type: ItemType) -> u64 {
        match item_type {
            ItemType::Word => self.word,
            ItemType::Sentence => self.sentence,
            ItemType::Shadowing => self.shadowing,
        }
    }

    const fn increment(&mut self, item_type: ItemType) {
        match item_type {
            ItemType::Word => self.word += 1,
            ItemType::Sentence => self.sentence += 1,
            ItemType::Shadowing => self.shadowing += 1,
        }
    }

    /// Attempts across every domain.
    pub const fn total(&self) -> u64 {
        self.word + self.sentence + self.shadowing
    }
}

/// Study time and attempt counts of one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyStats {
    /// Whole minutes, sessions summed then rounded once
    pub minutes: i64,
    pub counts: TypeCounts,
}

/// Chain attempts into sessions. Input order does not matter.
///
/// Sessions are only cut by gaps, never by calendar boundaries, so a session
/// may straddle midnight.
pub fn split_sessions(events: &[StudyEvent], settings: &EngineSettings) -> Vec<StudySession> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|event| event.occurred_at);

    let gap = settings.session_gap();
    let mut sessions: Vec<StudySession> = Vec::new();

    for event in &sorted {
        match sessions.last_mut() {
            Some(current) if event.occurred_at - current.ended_at <= gap => {
                current.ended_at = event.occurred_at;
                current.event_count += 1;
            }
            _ => sessions.push(StudySession::open(event)),
        }
    }

    sessions
}

/// Compute total study minutes and per-domain attempt counts.
pub fn compute_study_stats(events: &[StudyEvent], settings: &EngineSettings) -> StudyStats {
    let mut counts = TypeCounts::default();
    for event in events {
        counts.increment(event.item_type);
    }

    let minutes = split_sessions(events, settings)
        .iter()
        .map(|session| session.minutes(settings))
        .sum();

    StudyStats { minutes, counts }
}
