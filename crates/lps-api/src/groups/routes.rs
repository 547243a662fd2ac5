use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use super::service::{self, GroupView, ResetOutcome};
use crate::{ApiState, auth::AuthUser, error::ApiError, validation::SetRef};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/sets/{set}/groups", get(get_groups))
        .route("/sets/{set}/groups/{group_id}/reset", post(post_reset))
}

/// Anonymous visitors get the groups without progress
async fn get_groups(
    auth_user: Option<AuthUser>,
    State(state): State<ApiState>,
    WithRejection(Path(set), _): WithRejection<Path<String>, ApiError>,
) -> Result<Json<Vec<GroupView>>, ApiError> {
    let set_ref = SetRef::parse(&set)?;
    let user_id = auth_user.map(|user| user.user_id);

    let groups = service::list_groups(&state.pool, &state.settings, &set_ref, user_id).await?;
    Ok(Json(groups))
}

async fn post_reset(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Path((set, group_id)), _): WithRejection<Path<(String, Uuid)>, ApiError>,
) -> Result<Json<ResetOutcome>, ApiError> {
    let set_ref = SetRef::parse(&set)?;

    let outcome = service::reset_group(&state.pool, auth_user.user_id, &set_ref, group_id).await?;
    Ok(Json(outcome))
}
