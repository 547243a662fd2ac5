use lps_core::{
    ItemType,
    grouping::{GroupKind, ItemProgress, UngroupedItem},
};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Item, ItemGroup, ItemSet};

pub async fn find_set_by_id<'e, E>(
    executor: E,
    set_id: Uuid,
) -> Result<Option<ItemSet>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, slug, title, item_type
            FROM item_sets
            WHERE id = $1
        "#,
    )
    .bind(set_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_set_by_slug<'e, E>(
    executor: E,
    slug: &str,
) -> Result<Option<ItemSet>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, slug, title, item_type
            FROM item_sets
            WHERE slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(executor)
    .await
}

/// Take a row lock on the set for the rest of the transaction.
///
/// Serializes concurrent bucket creation for the same set.
pub async fn lock_set<'e, E>(executor: E, set_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let locked: Option<Uuid> = sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT id FROM item_sets WHERE id = $1 FOR UPDATE
        "#,
    )
    .bind(set_id)
    .fetch_optional(executor)
    .await?;
    Ok(locked.is_some())
}

pub async fn find_item<'e, E>(
    executor: E,
    item_id: Uuid,
    item_type: ItemType,
) -> Result<Option<Item>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, set_id, item_type, idx, text, normalized_text, group_id, group_index
            FROM items
            WHERE id = $1 AND item_type = $2
        "#,
    )
    .bind(item_id)
    .bind(item_type)
    .fetch_optional(executor)
    .await
}

pub async fn list_groups<'e, E>(executor: E, set_id: Uuid) -> Result<Vec<ItemGroup>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, set_id, name, kind, sort_order, created_at
            FROM item_groups
            WHERE set_id = $1
            ORDER BY sort_order, created_at, id
        "#,
    )
    .bind(set_id)
    .fetch_all(executor)
    .await
}

pub async fn find_group<'e, E>(
    executor: E,
    group_id: Uuid,
) -> Result<Option<ItemGroup>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, set_id, name, kind, sort_order, created_at
            FROM item_groups
            WHERE id = $1
        "#,
    )
    .bind(group_id)
    .fetch_optional(executor)
    .await
}

/// Highest order among the set's synthesized buckets.
pub async fn last_bucket_order<'e, E>(executor: E, set_id: Uuid) -> Result<Option<i32>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT MAX(sort_order)
            FROM item_groups
            WHERE set_id = $1 AND kind = 'size_bucket'
        "#,
    )
    .bind(set_id)
    .fetch_one(executor)
    .await
}

pub async fn list_ungrouped_items<'e, E>(
    executor: E,
    set_id: Uuid,
) -> Result<Vec<UngroupedItem>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, idx AS "index"
            FROM items
            WHERE set_id = $1 AND group_id IS NULL
            ORDER BY idx, id
        "#,
    )
    .bind(set_id)
    .fetch_all(executor)
    .await
}

pub async fn insert_group<'e, E>(
    executor: E,
    set_id: Uuid,
    name: &str,
    kind: GroupKind,
    sort_order: i32,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO item_groups (set_id, name, kind, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id
        "#,
    )
    .bind(set_id)
    .bind(name)
    .bind(kind)
    .bind(sort_order)
    .fetch_one(executor)
    .await
}

/// Assign `(item_id, group_index)` pairs to a group.
///
/// Items that already belong to a group are left untouched; the returned
/// count lets the caller detect that.
pub async fn assign_items<'e, E>(
    executor: E,
    group_id: Uuid,
    assignments: &[(Uuid, i32)],
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let (item_ids, positions): (Vec<Uuid>, Vec<i32>) = assignments.iter().copied().unzip();

    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE items AS i
            SET group_id = $1, group_index = a.position
            FROM UNNEST($2::uuid[], $3::int[]) AS a(item_id, position)
            WHERE i.id = a.item_id AND i.group_id IS NULL
        "#,
    )
    .bind(group_id)
    .bind(item_ids)
    .bind(positions)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Standing of a user on every item of a set. Without a user every item
/// comes back untouched.
pub async fn list_item_progress<'e, E>(
    executor: E,
    set_id: Uuid,
    user_id: Option<Uuid>,
) -> Result<Vec<ItemProgress>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                i.id AS item_id,
                i.group_id,
                COALESCE(BOOL_OR(a.correct OR a.mastered), FALSE) AS completed,
                MAX(a.occurred_at) AS last_attempt_at
            FROM items i
            LEFT JOIN attempt_events a
                ON a.item_id = i.id
                AND a.user_id = $2
                AND a.archived = FALSE
            WHERE i.set_id = $1
            GROUP BY i.id, i.group_id
        "#,
    )
    .bind(set_id)
    .bind(user_id)
    .fetch_all(executor)
    .await
}
