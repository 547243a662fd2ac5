use chrono::{DateTime, NaiveDate, Utc};
use lps_core::{
    EngineSettings,
    streak::{CheckinRejection, CheckinState, check_eligibility},
    window::{day_window, local_day},
};
use lps_db::repositories::checkins;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::ApiError, metrics, stats::service::stats_in_window};

/// One past checkin, for calendar rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinDay {
    pub date: NaiveDate,
    pub minutes: i32,
}

struct Today {
    date: NaiveDate,
    minutes: i64,
    checkin_dates: Vec<NaiveDate>,
}

async fn load_today(
    pool: &PgPool,
    settings: &EngineSettings,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Today, ApiError> {
    let offset = settings.utc_offset();
    let date = local_day(now, offset);
    let stats = stats_in_window(pool, settings, user_id, day_window(date, offset)?).await?;
    let checkin_dates = checkins::list_dates(pool, user_id).await?;

    Ok(Today {
        date,
        minutes: stats.minutes,
        checkin_dates,
    })
}

impl Today {
    fn state(&self, settings: &EngineSettings) -> CheckinState {
        CheckinState::evaluate(
            &self.checkin_dates,
            self.date,
            self.minutes,
            settings.min_checkin_minutes,
        )
    }
}

pub async fn checkin_status(
    pool: &PgPool,
    settings: &EngineSettings,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<CheckinState, ApiError> {
    Ok(load_today(pool, settings, user_id, now).await?.state(settings))
}

/// Record today's checkin.
///
/// The eligibility check runs on a snapshot; the primary key on
/// `(user_id, checkin_date)` settles races between concurrent calls.
pub async fn check_in(
    pool: &PgPool,
    settings: &EngineSettings,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<CheckinState, ApiError> {
    let mut today = load_today(pool, settings, user_id, now).await?;

    if let Err(rejection) = check_eligibility(
        today.checkin_dates.contains(&today.date),
        today.minutes,
        settings.min_checkin_minutes,
    ) {
        return Err(reject(rejection));
    }

    let minutes = i32::try_from(today.minutes).unwrap_or(i32::MAX);
    if !checkins::insert_checkin(pool, user_id, today.date, minutes).await? {
        return Err(reject(CheckinRejection::AlreadyCheckedIn));
    }

    metrics::record_checkin("success");
    tracing::info!(%user_id, date = %today.date, minutes, "Checkin recorded");

    today.checkin_dates.push(today.date);
    Ok(today.state(settings))
}

fn reject(rejection: CheckinRejection) -> ApiError {
    match rejection {
        CheckinRejection::AlreadyCheckedIn => {
            metrics::record_checkin("already_done");
            ApiError::AlreadyDone(rejection.to_string())
        }
        CheckinRejection::NotEnoughMinutes { .. } => {
            metrics::record_checkin("too_early");
            ApiError::Validation(rejection.to_string())
        }
    }
}

pub async fn checkin_history(
    pool: &PgPool,
    user_id: Uuid,
    limit: u32,
) -> Result<Vec<CheckinDay>, ApiError> {
    let records = checkins::list_recent(pool, user_id, i64::from(limit)).await?;

    Ok(records
        .into_iter()
        .map(|record| CheckinDay {
            date: record.checkin_date,
            minutes: record.minutes_at_checkin,
        })
        .collect())
}
