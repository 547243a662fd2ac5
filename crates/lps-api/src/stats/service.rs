use chrono::{DateTime, Utc};
use lps_core::{
    EngineSettings,
    session::{StudyStats, compute_study_stats},
    window::{StatsRange, TimeWindow},
};
use lps_db::{models::AttemptQuery, repositories::attempts};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStatsView {
    pub minutes: i64,
    pub word_count: u64,
    pub sentence_count: u64,
    pub shadowing_count: u64,
    pub range_start: DateTime<Utc>,
    pub range_end: DateTime<Utc>,
}

impl StudyStatsView {
    fn new(stats: StudyStats, window: TimeWindow) -> Self {
        Self {
            minutes: stats.minutes,
            word_count: stats.counts.word,
            sentence_count: stats.counts.sentence,
            shadowing_count: stats.counts.shadowing,
            range_start: window.start,
            range_end: window.end,
        }
    }
}

/// Study time and attempt counts of a user inside `window`.
///
/// Archived attempts still count: the time was spent even if the group was
/// reset afterwards.
pub async fn stats_in_window(
    pool: &PgPool,
    settings: &EngineSettings,
    user_id: Uuid,
    window: TimeWindow,
) -> Result<StudyStats, ApiError> {
    let query = AttemptQuery {
        include_archived: true,
        ..AttemptQuery::for_user(user_id).between(window.start, window.end)
    };
    let events = attempts::list_study_events(pool, &query).await?;

    Ok(compute_study_stats(&events, settings))
}

pub async fn study_stats(
    pool: &PgPool,
    settings: &EngineSettings,
    user_id: Uuid,
    range: StatsRange,
    now: DateTime<Utc>,
) -> Result<StudyStatsView, ApiError> {
    let window = range.resolve(now, settings.utc_offset())?;
    let stats = stats_in_window(pool, settings, user_id, window).await?;

    tracing::debug!(
        %user_id,
        minutes = stats.minutes,
        attempts = stats.counts.total(),
        "Computed study stats"
    );

    Ok(StudyStatsView::new(stats, window))
}
