use std::collections::HashSet;

use lps_core::{
    ItemType,
    review::{BacklogEntry, BacklogPage, NextReview, build_backlog, next_review, paginate},
};
use lps_db::repositories::{attempts, catalog};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::ApiError, metrics};

/// Ordered, deduplicated backlog of a user in one domain
async fn load_backlog(
    pool: &PgPool,
    user_id: Uuid,
    item_type: ItemType,
) -> Result<Vec<BacklogEntry>, ApiError> {
    let candidates = attempts::list_backlog_candidates(pool, user_id, item_type).await?;
    Ok(build_backlog(candidates, item_type))
}

pub async fn next_item(
    pool: &PgPool,
    user_id: Uuid,
    item_type: ItemType,
    exclude: &HashSet<Uuid>,
) -> Result<NextReview, ApiError> {
    let backlog = load_backlog(pool, user_id, item_type).await?;
    let next = next_review(&backlog, exclude);

    let outcome = match &next {
        NextReview::Item(_) => "item",
        NextReview::Completed => "completed",
    };
    metrics::record_review_request(item_type, outcome);
    tracing::debug!(
        %user_id,
        %item_type,
        backlog = backlog.len(),
        excluded = exclude.len(),
        outcome,
        "Selected next review item"
    );

    Ok(next)
}

pub async fn backlog_page(
    pool: &PgPool,
    user_id: Uuid,
    item_type: ItemType,
    offset: u64,
    limit: u32,
) -> Result<BacklogPage, ApiError> {
    let backlog = load_backlog(pool, user_id, item_type).await?;
    metrics::record_review_request(item_type, "page");
    Ok(paginate(backlog, offset, limit))
}

/// Take an item out of the user's backlog for good.
///
/// Marking an item twice, or one the user never attempted, succeeds without
/// changing anything.
pub async fn mark_mastered(
    pool: &PgPool,
    user_id: Uuid,
    item_type: ItemType,
    item_id: Uuid,
) -> Result<(), ApiError> {
    catalog::find_item(pool, item_id, item_type)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No {item_type} item with id {item_id}")))?;

    let updated = attempts::mark_mastered(pool, user_id, item_id).await?;

    metrics::record_review_request(item_type, "mastered");
    tracing::info!(%user_id, %item_id, %item_type, updated, "Item marked as mastered");

    Ok(())
}
