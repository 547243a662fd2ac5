//! Daily checkin streaks.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the run of consecutive checkin days ending today or yesterday.
///
/// A streak stays alive through the current day: if the learner checked in
/// yesterday but not yet today, the streak still counts from yesterday. Any
/// earlier most-recent checkin means the chain is broken.
///
/// `dates` may come in any order and may contain duplicates.
pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut dates = dates.to_vec();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();

    let Some(&latest) = dates.first() else {
        return 0;
    };
    let Some(yesterday) = today.checked_sub_days(Days::new(1)) else {
        return u32::from(latest == today);
    };
    if latest != today && latest != yesterday {
        return 0;
    }

    let mut expected = latest;
    let mut streak = 0;
    for date in dates {
        if date != expected {
            break;
        }
        streak += 1;
        match expected.checked_sub_days(Days::new(1)) {
            Some(previous) => expected = previous,
            None => break,
        }
    }

    streak
}

/// Checkin state shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinState {
    /// Minutes studied since local midnight
    pub today_minutes: i64,
    pub total_checkins: u64,
    /// Consecutive days ending today, or yesterday if today is still open
    pub streak_days: u32,
    pub has_checked_in_today: bool,
    pub can_check_in: bool,
}

impl CheckinState {
    /// Derive the state from every checkin date of a user.
    pub fn evaluate(
        dates: &[NaiveDate],
        today: NaiveDate,
        today_minutes: i64,
        min_minutes: i64,
    ) -> Self {
        let has_checked_in_today = dates.contains(&today);
        let can_check_in =
            check_eligibility(has_checked_in_today, today_minutes, min_minutes).is_ok();
        Self {
            today_minutes,
            total_checkins: dates.len() as u64,
            streak_days: current_streak(dates, today),
            has_checked_in_today,
            can_check_in,
        }
    }
}

/// Why a checkin cannot be recorded today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckinRejection {
    #[error("already checked in today")]
    AlreadyCheckedIn,
    #[error("study at least {required} minutes today before checking in ({studied} so far)")]
    NotEnoughMinutes { studied: i64, required: i64 },
}

/// Decide whether a checkin for today may be recorded.
pub const fn check_eligibility(
    has_checked_in_today: bool,
    today_minutes: i64,
    min_minutes: i64,
) -> Result<(), CheckinRejection> {
    if has_checked_in_today {
        return Err(CheckinRejection::AlreadyCheckedIn);
    }
    if today_minutes < min_minutes {
        return Err(CheckinRejection::NotEnoughMinutes {
            studied: today_minutes,
            required: min_minutes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).expect("valid date")
    }

    #[test]
    fn test_no_checkins() {
        assert_eq!(current_streak(&[], day(14)), 0);
    }

    #[test]
    fn test_streak_including_today() {
        let dates = [day(14), day(13), day(12)];
        assert_eq!(current_streak(&dates, day(14)), 3);
    }

    #[test]
    fn test_streak_still_alive_from_yesterday() {
        let dates = [day(13), day(12), day(11)];
        assert_eq!(current_streak(&dates, day(14)), 3);
    }

    #[test]
    fn test_broken_chain() {
        let dates = [day(12), day(11), day(10)];
        assert_eq!(current_streak(&dates, day(14)), 0);
    }

    #[test]
    fn test_stops_at_first_gap() {
        let dates = [day(14), day(13), day(11), day(10), day(9)];
        assert_eq!(current_streak(&dates, day(14)), 2);
    }

    #[test]
    fn test_unsorted_and_duplicate_dates() {
        let dates = [day(12), day(14), day(13), day(14)];
        assert_eq!(current_streak(&dates, day(14)), 3);
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let dates = [
            NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 2, 28).expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 2, 27).expect("valid date"),
        ];
        assert_eq!(current_streak(&dates, day(1)), 3);
    }

    #[test]
    fn test_checkin_scenario() {
        // Checked in the three previous days, not yet today, 15 minutes studied
        let mut dates = vec![day(13), day(12), day(11)];
        let state = CheckinState::evaluate(&dates, day(14), 15, 10);
        assert!(state.can_check_in);
        assert!(!state.has_checked_in_today);
        assert_eq!(state.streak_days, 3);
        assert_eq!(state.total_checkins, 3);

        dates.insert(0, day(14));
        let state = CheckinState::evaluate(&dates, day(14), 15, 10);
        assert_eq!(state.streak_days, 4);
        assert_eq!(state.total_checkins, 4);
        assert!(state.has_checked_in_today);
        assert!(!state.can_check_in);
    }

    #[test]
    fn test_eligibility() {
        assert_eq!(check_eligibility(false, 10, 10), Ok(()));
        assert_eq!(
            check_eligibility(false, 9, 10),
            Err(CheckinRejection::NotEnoughMinutes {
                studied: 9,
                required: 10
            })
        );
        assert_eq!(
            check_eligibility(true, 60, 10),
            Err(CheckinRejection::AlreadyCheckedIn)
        );
    }

    #[test]
    fn test_not_enough_minutes_blocks_checkin() {
        let state = CheckinState::evaluate(&[], day(14), 9, 10);
        assert!(!state.can_check_in);
        assert_eq!(state.streak_days, 0);
    }
}
