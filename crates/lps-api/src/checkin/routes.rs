use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use lps_core::streak::CheckinState;
use serde::Deserialize;
use validator::Validate;

use super::service::{self, CheckinDay};
use crate::{ApiState, auth::AuthUser, error::ApiError};

const DEFAULT_HISTORY_LIMIT: u32 = 30;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/checkin", get(get_status).post(post_checkin))
        .route("/checkin/history", get(get_history))
}

#[derive(Debug, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(range(min = 1, max = 366))]
    pub limit: Option<u32>,
}

async fn get_status(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<CheckinState>, ApiError> {
    let status =
        service::checkin_status(&state.pool, &state.settings, auth_user.user_id, Utc::now())
            .await?;
    Ok(Json(status))
}

async fn post_checkin(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<CheckinState>, ApiError> {
    let status =
        service::check_in(&state.pool, &state.settings, auth_user.user_id, Utc::now()).await?;
    Ok(Json(status))
}

async fn get_history(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Query(query), _): WithRejection<Query<HistoryQuery>, ApiError>,
) -> Result<Json<Vec<CheckinDay>>, ApiError> {
    query
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let history = service::checkin_history(&state.pool, auth_user.user_id, limit).await?;
    Ok(Json(history))
}
