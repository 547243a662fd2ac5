use lps_core::{ItemType, review::BacklogCandidate, session::StudyEvent};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{AttemptEventInsert, AttemptQuery};

pub async fn insert_attempt<'e, E>(
    executor: E,
    attempt: &AttemptEventInsert,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO attempt_events (user_id, item_id, item_type, occurred_at, correct)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
        "#,
    )
    .bind(attempt.user_id)
    .bind(attempt.item_id)
    .bind(attempt.item_type)
    .bind(attempt.occurred_at)
    .bind(attempt.correct)
    .fetch_one(executor)
    .await
}

/// Timestamps and domains of the attempts matching `query`, oldest first.
pub async fn list_study_events<'e, E>(
    executor: E,
    query: &AttemptQuery,
) -> Result<Vec<StudyEvent>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT occurred_at, item_type
            FROM attempt_events
            WHERE user_id = $1
                AND ($2::timestamptz IS NULL OR occurred_at >= $2)
                AND ($3::timestamptz IS NULL OR occurred_at < $3)
                AND ($4::item_type IS NULL OR item_type = $4)
                AND ($5::boolean IS NULL OR correct = $5)
                AND ($6 OR archived = FALSE)
            ORDER BY occurred_at
        "#,
    )
    .bind(query.user_id)
    .bind(query.start)
    .bind(query.end)
    .bind(query.item_type)
    .bind(query.correct)
    .bind(query.include_archived)
    .fetch_all(executor)
    .await
}

/// Per-item aggregates of every item the user ever missed in a domain.
///
/// Only non-archived attempts count. A group reset therefore clears both
/// the misses and the mastered flag of its items.
pub async fn list_backlog_candidates<'e, E>(
    executor: E,
    user_id: Uuid,
    item_type: ItemType,
) -> Result<Vec<BacklogCandidate>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                i.id AS item_id,
                i.set_id,
                i.item_type,
                i.text,
                i.normalized_text,
                COUNT(*) FILTER (WHERE NOT a.correct AND NOT a.archived) AS wrong_count,
                MAX(a.occurred_at) FILTER (WHERE NOT a.correct AND NOT a.archived) AS last_missed_at,
                COALESCE(BOOL_OR(a.mastered) FILTER (WHERE NOT a.archived), FALSE) AS mastered
            FROM attempt_events a
            JOIN items i ON i.id = a.item_id
            WHERE a.user_id = $1 AND a.item_type = $2
            GROUP BY i.id, i.set_id, i.item_type, i.text, i.normalized_text
            HAVING COUNT(*) FILTER (WHERE NOT a.correct AND NOT a.archived) > 0
        "#,
    )
    .bind(user_id)
    .bind(item_type)
    .fetch_all(executor)
    .await
}

/// Flag every attempt of the pair as mastered. Returns the number of rows touched.
pub async fn mark_mastered<'e, E>(
    executor: E,
    user_id: Uuid,
    item_id: Uuid,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE attempt_events
            SET mastered = TRUE
            WHERE user_id = $1 AND item_id = $2 AND mastered = FALSE
        "#,
    )
    .bind(user_id)
    .bind(item_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Archive the user's live attempts on every item of a group.
pub async fn archive_group_attempts<'e, E>(
    executor: E,
    user_id: Uuid,
    group_id: Uuid,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE attempt_events a
            SET archived = TRUE
            FROM items i
            WHERE a.item_id = i.id
                AND i.group_id = $2
                AND a.user_id = $1
                AND a.archived = FALSE
        "#,
    )
    .bind(user_id)
    .bind(group_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
