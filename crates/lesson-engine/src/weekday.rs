//! Weekday arithmetic -- the next occurrence of a named weekday relative to a date.
//!
//! All arithmetic uses the canonical Sunday-first ordering: Sunday = 0 through
//! Saturday = 6. Every function here is pure and returns a new date value.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One of the seven calendar weekdays, ordered Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeekdayName {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekdayName {
    pub const ALL: [WeekdayName; 7] = [
        WeekdayName::Sunday,
        WeekdayName::Monday,
        WeekdayName::Tuesday,
        WeekdayName::Wednesday,
        WeekdayName::Thursday,
        WeekdayName::Friday,
        WeekdayName::Saturday,
    ];

    /// Position in the Sunday-first ordering (0..=6).
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Inverse of [`index`](Self::index); wraps modulo 7.
    pub fn from_index(index: u32) -> Self {
        Self::ALL[(index % 7) as usize]
    }

    /// Two-letter RFC 5545 BYDAY code.
    pub fn ical_code(self) -> &'static str {
        match self {
            WeekdayName::Sunday => "SU",
            WeekdayName::Monday => "MO",
            WeekdayName::Tuesday => "TU",
            WeekdayName::Wednesday => "WE",
            WeekdayName::Thursday => "TH",
            WeekdayName::Friday => "FR",
            WeekdayName::Saturday => "SA",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            WeekdayName::Sunday => "Sunday",
            WeekdayName::Monday => "Monday",
            WeekdayName::Tuesday => "Tuesday",
            WeekdayName::Wednesday => "Wednesday",
            WeekdayName::Thursday => "Thursday",
            WeekdayName::Friday => "Friday",
            WeekdayName::Saturday => "Saturday",
        }
    }
}

impl From<Weekday> for WeekdayName {
    fn from(day: Weekday) -> Self {
        Self::from_index(day.num_days_from_sunday())
    }
}

impl From<WeekdayName> for Weekday {
    fn from(day: WeekdayName) -> Self {
        match day {
            WeekdayName::Sunday => Weekday::Sun,
            WeekdayName::Monday => Weekday::Mon,
            WeekdayName::Tuesday => Weekday::Tue,
            WeekdayName::Wednesday => Weekday::Wed,
            WeekdayName::Thursday => Weekday::Thu,
            WeekdayName::Friday => Weekday::Fri,
            WeekdayName::Saturday => Weekday::Sat,
        }
    }
}

impl fmt::Display for WeekdayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekdayName {
    type Err = ValidationError;

    /// Accepts full names and three-letter abbreviations, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| {
                let full = day.as_str().to_ascii_lowercase();
                wanted == full || (wanted.len() == 3 && full.starts_with(&wanted))
            })
            .ok_or_else(|| ValidationError::UnknownWeekday(s.to_string()))
    }
}

/// The weekday a calendar date falls on.
pub fn weekday_of(date: NaiveDate) -> WeekdayName {
    date.weekday().into()
}

/// Days from `from` forward to the next `target`, in `0..=6`.
fn days_until(from: NaiveDate, target: WeekdayName) -> u32 {
    (target.index() + 7 - weekday_of(from).index()) % 7
}

/// Next date on or after `from` that falls on `target`.
///
/// With `include_today = false` a match on `from` itself is pushed a full week
/// out, so the result is strictly in the future.
pub fn next_occurrence(from: NaiveDate, target: WeekdayName, include_today: bool) -> NaiveDate {
    let mut diff = days_until(from, target);
    if diff == 0 && !include_today {
        diff = 7;
    }
    from + Duration::days(i64::from(diff))
}

/// Date of `target` within the seven-day window that opens on `week_start`.
///
/// The window includes `week_start` itself.
pub fn date_for_weekday_in_week(week_start: NaiveDate, target: WeekdayName) -> NaiveDate {
    next_occurrence(week_start, target, true)
}
