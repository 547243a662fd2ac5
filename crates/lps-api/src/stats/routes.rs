use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use lps_core::window::{RangeKind, StatsRange};
use serde::Deserialize;

use super::service::{self, StudyStatsView};
use crate::{ApiState, auth::AuthUser, error::ApiError};

pub fn routes() -> Router<ApiState> {
    Router::new().route("/stats", get(get_stats))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// `day`, `week`, `month` or `custom`, defaults to `day`
    pub range: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl StatsQuery {
    fn into_range(self) -> Result<StatsRange, ApiError> {
        let kind = match self.range.as_deref() {
            Some(raw) => raw.parse::<RangeKind>()?,
            None => RangeKind::default(),
        };
        Ok(StatsRange::from_parts(kind, self.start, self.end)?)
    }
}

async fn get_stats(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Query(query), _): WithRejection<Query<StatsQuery>, ApiError>,
) -> Result<Json<StudyStatsView>, ApiError> {
    let range = query.into_range()?;
    let view = service::study_stats(
        &state.pool,
        &state.settings,
        auth_user.user_id,
        range,
        Utc::now(),
    )
    .await?;

    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(range: Option<&str>, start: Option<&str>, end: Option<&str>) -> StatsQuery {
        let parse = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .expect("valid timestamp")
                .with_timezone(&Utc)
        };
        StatsQuery {
            range: range.map(String::from),
            start: start.map(parse),
            end: end.map(parse),
        }
    }

    #[test]
    fn test_range_defaults_to_day() {
        assert_eq!(query(None, None, None).into_range().unwrap(), StatsRange::Day);
        assert_eq!(
            query(Some("today"), None, None).into_range().unwrap(),
            StatsRange::Day
        );
        assert_eq!(
            query(Some("Week"), None, None).into_range().unwrap(),
            StatsRange::Week
        );
    }

    #[test]
    fn test_custom_range_needs_bounds() {
        assert!(matches!(
            query(Some("custom"), Some("2025-03-01T00:00:00Z"), None).into_range(),
            Err(ApiError::Validation(_))
        ));

        let range = query(
            Some("custom"),
            Some("2025-03-01T00:00:00Z"),
            Some("2025-03-08T00:00:00Z"),
        )
        .into_range()
        .unwrap();
        assert!(matches!(range, StatsRange::Custom { .. }));
    }

    #[test]
    fn test_unknown_range_is_rejected() {
        assert!(matches!(
            query(Some("year"), None, None).into_range(),
            Err(ApiError::Validation(_))
        ));
    }
}
