use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::service;
use crate::{ApiState, auth::AuthUser, error::ApiError, validation::parse_domain};

pub fn routes() -> Router<ApiState> {
    Router::new().route("/practice/{domain}/attempts", post(record_attempt))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSubmission {
    pub item_id: Uuid,
    pub correct: bool,
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AttemptRecorded {
    pub id: i64,
}

async fn record_attempt(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Path(domain), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<AttemptSubmission>, ApiError>,
) -> Result<(StatusCode, Json<AttemptRecorded>), ApiError> {
    let item_type = parse_domain(&domain)?;
    let occurred_at = service::resolve_occurred_at(payload.occurred_at, Utc::now())?;

    let id = service::record_attempt(
        &state.pool,
        auth_user.user_id,
        item_type,
        payload.item_id,
        payload.correct,
        occurred_at,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(AttemptRecorded { id })))
}
