//! Calendar windows in the learners' local zone.

use std::{fmt, str::FromStr};

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    Utc,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half-open `[start, end)` interval of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive
    pub start: DateTime<Utc>,
    /// Exclusive
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Whether `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// A statistics range that cannot be turned into a window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("range start must be before range end")]
    InvalidRange,
    #[error("custom range requires both start and end")]
    MissingBounds,
    #[error("date is out of the supported range")]
    OutOfRange,
    #[error("unknown range '{0}', expected one of: day, week, month, custom")]
    UnknownKind(String),
}

/// Which period a statistics request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsRange {
    Day,
    /// ISO week, starting Monday
    Week,
    Month,
    Custom {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Range selector without the custom bounds, as it arrives in a query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKind {
    #[default]
    Day,
    Week,
    Month,
    Custom,
}

impl FromStr for RangeKind {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "today" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "custom" => Ok(Self::Custom),
            _ => Err(WindowError::UnknownKind(s.to_string())),
        }
    }
}

impl fmt::Display for RangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Custom => "custom",
        })
    }
}

impl StatsRange {
    /// Combine a range kind with optional explicit bounds.
    pub fn from_parts(
        kind: RangeKind,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, WindowError> {
        match kind {
            RangeKind::Day => Ok(Self::Day),
            RangeKind::Week => Ok(Self::Week),
            RangeKind::Month => Ok(Self::Month),
            RangeKind::Custom => match (start, end) {
                (Some(start), Some(end)) => Ok(Self::Custom { start, end }),
                _ => Err(WindowError::MissingBounds),
            },
        }
    }

    /// Resolve the range against `now` in the given local zone.
    pub fn resolve(
        self,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Result<TimeWindow, WindowError> {
        let today = local_day(now, offset);

        let (first_day, last_day_exclusive) = match self {
            Self::Custom { start, end } => {
                if start >= end {
                    return Err(WindowError::InvalidRange);
                }
                return Ok(TimeWindow { start, end });
            }
            Self::Day => (today, next_day(today)?),
            Self::Week => {
                let monday = today
                    .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
                    .ok_or(WindowError::OutOfRange)?;
                let next_monday = monday
                    .checked_add_days(Days::new(7))
                    .ok_or(WindowError::OutOfRange)?;
                (monday, next_monday)
            }
            Self::Month => {
                let first = today.with_day(1).ok_or(WindowError::OutOfRange)?;
                let next = first
                    .checked_add_months(Months::new(1))
                    .ok_or(WindowError::OutOfRange)?;
                (first, next)
            }
        };

        Ok(TimeWindow {
            start: local_midnight(first_day, offset),
            end: local_midnight(last_day_exclusive, offset),
        })
    }
}

/// Calendar day of `instant` in the given zone.
pub fn local_day(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// The instant a local calendar day begins.
pub fn local_midnight(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local: NaiveDateTime = day.and_time(NaiveTime::MIN);
    (local - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// Window covering one local calendar day.
pub fn day_window(day: NaiveDate, offset: FixedOffset) -> Result<TimeWindow, WindowError> {
    Ok(TimeWindow {
        start: local_midnight(day, offset),
        end: local_midnight(next_day(day)?, offset),
    })
}

fn next_day(day: NaiveDate) -> Result<NaiveDate, WindowError> {
    day.succ_opt().ok_or(WindowError::OutOfRange)
}
