use chrono::{DateTime, TimeDelta, Utc};
use lps_core::ItemType;
use lps_db::{
    models::AttemptEventInsert,
    repositories::{attempts, catalog},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

/// How far ahead of the server clock a client timestamp may be
const MAX_CLOCK_SKEW_MINUTES: i64 = 5;

/// Check a client supplied timestamp, defaulting to `now`.
pub fn resolve_occurred_at(
    occurred_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ApiError> {
    match occurred_at {
        None => Ok(now),
        Some(at) if at > now + TimeDelta::minutes(MAX_CLOCK_SKEW_MINUTES) => Err(
            ApiError::Validation("occurredAt cannot be in the future".to_string()),
        ),
        Some(at) => Ok(at),
    }
}

/// Append one attempt to the user's history. Returns the attempt id.
pub async fn record_attempt(
    pool: &PgPool,
    user_id: Uuid,
    item_type: ItemType,
    item_id: Uuid,
    correct: bool,
    occurred_at: DateTime<Utc>,
) -> Result<i64, ApiError> {
    catalog::find_item(pool, item_id, item_type)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No {item_type} item with id {item_id}")))?;

    let attempt = AttemptEventInsert {
        user_id,
        item_id,
        item_type,
        occurred_at,
        correct,
    };
    let id = attempts::insert_attempt(pool, &attempt).await?;

    tracing::debug!(%user_id, %item_id, %item_type, correct, "Attempt recorded");

    Ok(id)
}
