//! Reporting period presets: today, the current ISO week, or the current
//! calendar month, resolved to inclusive date bounds.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReportPreset {
    Day,
    Week,
    Month,
}

impl ReportPreset {
    /// Inclusive bounds of the preset containing `today`.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            ReportPreset::Day => (today, today),
            ReportPreset::Week => {
                let monday =
                    today - Duration::days(today.weekday().num_days_from_monday() as i64);
                (monday, monday + Duration::days(6))
            }
            ReportPreset::Month => month_bounds(today),
        }
    }
}

/// First and last day of the calendar month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).expect("day 1 always exists");
    let last = first + Months::new(1) - Duration::days(1);
    (first, last)
}
