use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::CheckinRecord;

/// Every checkin day of a user, most recent first.
pub async fn list_dates<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<NaiveDate>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT checkin_date
            FROM checkin_records
            WHERE user_id = $1
            ORDER BY checkin_date DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn list_recent<'e, E>(
    executor: E,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<CheckinRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, checkin_date, minutes_at_checkin, created_at
            FROM checkin_records
            WHERE user_id = $1
            ORDER BY checkin_date DESC
            LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(executor)
    .await
}

/// Record a checkin. Returns `false` when the user already has one for
/// that day, which is decided by the primary key rather than a prior read
/// so concurrent requests cannot both succeed.
pub async fn insert_checkin<'e, E>(
    executor: E,
    user_id: Uuid,
    checkin_date: NaiveDate,
    minutes_at_checkin: i32,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO checkin_records (user_id, checkin_date, minutes_at_checkin)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, checkin_date) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(checkin_date)
    .bind(minutes_at_checkin)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}
