use chrono::{DateTime, Utc};
use lps_core::{
    EngineSettings,
    grouping::{GroupKind, GroupingStrategy, choose_strategy, plan_size_buckets, tally_progress},
};
use lps_db::{
    models::{ItemGroup, ItemSet},
    repositories::{attempts, catalog},
};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{error::ApiError, metrics, validation::SetRef};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: Uuid,
    /// Stable identity, `explicit:<id>` or `bucket:<set>:<n>`
    pub key: String,
    pub name: String,
    pub kind: GroupKind,
    pub order: i32,
    pub total: u64,
    pub done: u64,
    pub last_studied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResetOutcome {
    pub archived: u64,
}

pub async fn resolve_set(pool: &PgPool, set_ref: &SetRef) -> Result<ItemSet, ApiError> {
    let set = match set_ref {
        SetRef::Id(id) => catalog::find_set_by_id(pool, *id).await?,
        SetRef::Slug(slug) => catalog::find_set_by_slug(pool, slug).await?,
    };
    set.ok_or_else(|| ApiError::NotFound("Set not found".to_string()))
}

/// Groups of a set with the user's progress on each.
///
/// Without a user every group reports nothing done.
pub async fn list_groups(
    pool: &PgPool,
    settings: &EngineSettings,
    set_ref: &SetRef,
    user_id: Option<Uuid>,
) -> Result<Vec<GroupView>, ApiError> {
    let set = resolve_set(pool, set_ref).await?;
    let groups = ensure_groups(pool, settings, set.id).await?;

    let progress = catalog::list_item_progress(pool, set.id, user_id).await?;
    let tally = tally_progress(&progress);

    Ok(groups
        .into_iter()
        .map(|group| {
            let progress = tally.get(&group.id).copied().unwrap_or_default();
            GroupView {
                id: group.id,
                key: group.key().to_string(),
                name: group.name,
                kind: group.kind,
                order: group.sort_order,
                total: progress.total,
                done: progress.done,
                last_studied_at: progress.last_studied_at,
            }
        })
        .collect())
}

/// Groups to show for a set, bucketing any ungrouped items first.
async fn ensure_groups(
    pool: &PgPool,
    settings: &EngineSettings,
    set_id: Uuid,
) -> Result<Vec<ItemGroup>, ApiError> {
    // Lock-free look first: once a set is fully grouped, reads never
    // contend on the set row
    let mut conn = pool.acquire().await?;
    if let Some(groups) = settled_groups(&mut *conn, set_id).await? {
        return Ok(groups);
    }
    drop(conn);

    let mut tx = pool.begin().await?;
    if !catalog::lock_set(&mut *tx, set_id).await? {
        return Err(ApiError::NotFound("Set not found".to_string()));
    }

    // Another request may have bucketed the set while we waited
    if let Some(groups) = settled_groups(&mut *tx, set_id).await? {
        tx.commit().await?;
        return Ok(groups);
    }

    let ungrouped = catalog::list_ungrouped_items(&mut *tx, set_id).await?;
    let last_order = catalog::last_bucket_order(&mut *tx, set_id).await?;
    let plans = plan_size_buckets(
        set_id,
        last_order,
        ungrouped,
        settings.bucket_size,
        settings.group_name_locale,
    );

    for plan in &plans {
        let group_id =
            catalog::insert_group(&mut *tx, set_id, &plan.name, GroupKind::SizeBucket, plan.order)
                .await?;
        let assignments: Vec<_> = plan.assignments().collect();
        let assigned = catalog::assign_items(&mut *tx, group_id, &assignments).await?;

        // Dropping the transaction rolls every bucket back
        if assigned != assignments.len() as u64 {
            return Err(ApiError::Internal(format!(
                "bucket {} of set {set_id}: assigned {assigned} of {} items",
                plan.key,
                assignments.len()
            )));
        }
    }

    let groups = catalog::list_groups(&mut *tx, set_id).await?;
    tx.commit().await?;

    metrics::record_buckets_created(plans.len());
    tracing::info!(%set_id, buckets = plans.len(), "Created size buckets");

    Ok(groups)
}

/// The set's groups if nothing is left to bucket, `None` otherwise.
async fn settled_groups(
    conn: &mut PgConnection,
    set_id: Uuid,
) -> Result<Option<Vec<ItemGroup>>, ApiError> {
    let groups = catalog::list_groups(&mut *conn, set_id).await?;
    let kinds: Vec<GroupKind> = groups.iter().map(|group| group.kind).collect();

    match choose_strategy(&kinds) {
        GroupingStrategy::Explicit => Ok(Some(
            groups
                .into_iter()
                .filter(|group| group.kind == GroupKind::Explicit)
                .collect(),
        )),
        GroupingStrategy::SizeBuckets => {
            let ungrouped = catalog::list_ungrouped_items(&mut *conn, set_id).await?;
            Ok(ungrouped.is_empty().then_some(groups))
        }
    }
}

/// Archive the user's attempts on one group so it can be studied afresh.
pub async fn reset_group(
    pool: &PgPool,
    user_id: Uuid,
    set_ref: &SetRef,
    group_id: Uuid,
) -> Result<ResetOutcome, ApiError> {
    let set = resolve_set(pool, set_ref).await?;
    let group = catalog::find_group(pool, group_id)
        .await?
        .filter(|group| group.set_id == set.id)
        .ok_or_else(|| ApiError::NotFound("Group not found in this set".to_string()))?;

    let archived = attempts::archive_group_attempts(pool, user_id, group.id).await?;
    if archived == 0 {
        return Err(ApiError::AlreadyDone(
            "Nothing to reset in this group".to_string(),
        ));
    }

    tracing::info!(%user_id, group_id = %group.id, archived, "Group progress reset");

    Ok(ResetOutcome { archived })
}
