use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use lps_core::review::{BacklogEntry, BacklogPage, NextReview};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use super::service;
use crate::{
    ApiState,
    auth::AuthUser,
    error::ApiError,
    validation::{PageParams, parse_domain, parse_exclude},
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/review/{domain}", get(get_backlog))
        .route("/review/{domain}/next", get(get_next))
        .route("/review/{domain}/{item_id}/mastered", post(post_mastered))
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    /// Comma separated ids already shown in this sitting
    pub exclude: Option<String>,
}

/// Either the item to show or `{"completed": true}`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum NextReviewView {
    Item(BacklogEntry),
    Completed { completed: bool },
}

impl From<NextReview> for NextReviewView {
    fn from(next: NextReview) -> Self {
        match next {
            NextReview::Item(entry) => Self::Item(entry),
            NextReview::Completed => Self::Completed { completed: true },
        }
    }
}

async fn get_next(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Path(domain), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Query(query), _): WithRejection<Query<NextQuery>, ApiError>,
) -> Result<Json<NextReviewView>, ApiError> {
    let item_type = parse_domain(&domain)?;
    let exclude = parse_exclude(query.exclude.as_deref())?;

    let next = service::next_item(&state.pool, auth_user.user_id, item_type, &exclude).await?;
    Ok(Json(next.into()))
}

async fn get_backlog(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Path(domain), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Query(page), _): WithRejection<Query<PageParams>, ApiError>,
) -> Result<Json<BacklogPage>, ApiError> {
    let item_type = parse_domain(&domain)?;
    let (offset, limit) = page.resolve()?;

    let page =
        service::backlog_page(&state.pool, auth_user.user_id, item_type, offset, limit).await?;
    Ok(Json(page))
}

async fn post_mastered(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Path((domain, item_id)), _): WithRejection<Path<(String, Uuid)>, ApiError>,
) -> Result<Json<Value>, ApiError> {
    let item_type = parse_domain(&domain)?;

    service::mark_mastered(&state.pool, auth_user.user_id, item_type, item_id).await?;
    Ok(Json(json!({ "success": true })))
}
