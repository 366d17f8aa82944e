//! Date helpers for the schedule page.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use gallerydesk_protocol::constants::SCHEDULE_DATE_FORMAT;

/// Day, hour and minute offsets applied to a base moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateOffset {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl DateOffset {
    pub fn days(days: i64) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    /// Offset that moves `base` to midnight of `target`.
    pub fn to_date(base: NaiveDate, target: NaiveDate) -> Self {
        Self::days((target - base).num_days())
    }

    /// `None` when the offset or the result is out of range.
    pub fn apply(&self, base: NaiveDateTime) -> Option<NaiveDateTime> {
        base.checked_add_signed(TimeDelta::try_days(self.days)?)?
            .checked_add_signed(TimeDelta::try_hours(self.hours)?)?
            .checked_add_signed(TimeDelta::try_minutes(self.minutes)?)
    }
}

/// `YYYY/MM/DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(SCHEDULE_DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), SCHEDULE_DATE_FORMAT).ok()
}

/// End date of a new event-detail range: `today + default_day`.
///
/// `None` when the date would be out of range.
pub fn detail_end_date(today: NaiveDate, default_day: i64) -> Option<String> {
    let end = today.checked_add_signed(TimeDelta::try_days(default_day)?)?;
    Some(format_date(end))
}
