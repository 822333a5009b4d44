//! Conversion between split hour/minute/meridiem input and the combined
//! `YYYY-MM-DDTHH:MM` wall-clock representation used at the storage boundary.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const HHMM: &str = "%H:%M";
const COMBINED: &str = "%Y-%m-%dT%H:%M";

/// AM or PM half of a 12-hour clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Meridiem {
    Am,
    Pm,
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        })
    }
}

impl FromStr for Meridiem {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AM" => Ok(Meridiem::Am),
            "PM" => Ok(Meridiem::Pm),
            other => Err(ValidationError::InvalidTime(format!(
                "expected AM or PM, got '{}'",
                other
            ))),
        }
    }
}

/// Convert a 12-hour reading to a time of day. 12 AM is midnight, 12 PM is noon.
///
/// # Errors
/// Returns `ValidationError::InvalidTime` unless `hour` is 1..=12 and `minute` 0..=59.
pub fn to_24_hour(hour: u32, minute: u32, meridiem: Meridiem) -> Result<NaiveTime, ValidationError> {
    if !(1..=12).contains(&hour) {
        return Err(ValidationError::InvalidTime(format!(
            "hour {} is outside 1-12",
            hour
        )));
    }
    let hour24 = match (meridiem, hour) {
        (Meridiem::Am, 12) => 0,
        (Meridiem::Am, h) => h,
        (Meridiem::Pm, 12) => 12,
        (Meridiem::Pm, h) => h + 12,
    };
    NaiveTime::from_hms_opt(hour24, minute, 0)
        .ok_or_else(|| ValidationError::InvalidTime(format!("minute {} is outside 0-59", minute)))
}

/// Split a time of day back into the 12-hour form a caller edits.
pub fn split_12_hour(time: NaiveTime) -> (u32, u32, Meridiem) {
    let (is_pm, hour) = time.hour12();
    let meridiem = if is_pm { Meridiem::Pm } else { Meridiem::Am };
    (hour, time.minute(), meridiem)
}

/// `"HH:MM"`, zero padded.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format(HHMM).to_string()
}

pub fn parse_hhmm(s: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s.trim(), HHMM)
        .map_err(|e| ValidationError::InvalidTime(format!("'{}': {}", s, e)))
}

/// `date + "T" + HH:MM`.
pub fn combine(date: NaiveDate, time: NaiveTime) -> String {
    date.and_time(time).format(COMBINED).to_string()
}

pub fn parse_combined(s: &str) -> Result<NaiveDateTime, ValidationError> {
    NaiveDateTime::parse_from_str(s.trim(), COMBINED)
        .map_err(|e| ValidationError::InvalidTime(format!("'{}': {}", s, e)))
}

/// Resolve a wall-clock date and time in `tz` to a UTC instant.
///
/// Ambiguous readings (DST fall-back) take the earlier instant; readings inside
/// a spring-forward gap are rejected.
pub fn to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> Result<DateTime<Utc>, ValidationError> {
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(ValidationError::InvalidTime(format!(
            "{} does not exist in {}",
            combine(date, time),
            tz
        ))),
    }
}

/// The calendar date right now in `tz`.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Serde adapter storing a `NaiveTime` as `"HH:MM"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hhmm(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}
