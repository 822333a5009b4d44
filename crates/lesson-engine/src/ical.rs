//! RFC 5545 export of a weekly recurrence.
//!
//! Renders a [`RecurrenceSpec`] as an RRULE and expands it through the `rrule`
//! crate in a named timezone. Anchored on the recurrence's earliest start, the
//! expansion yields the same dates as [`crate::generator::generate_sessions`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::error::ValidationError;
use crate::recurrence::{RecurrenceSpec, MAX_TOTAL_SESSIONS};

/// `FREQ=WEEKLY;BYDAY=MO,WE;COUNT=n`.
pub fn to_rrule(recurrence: &RecurrenceSpec) -> String {
    let byday: Vec<&str> = recurrence
        .weekdays()
        .iter()
        .map(|day| day.ical_code())
        .collect();
    format!(
        "FREQ=WEEKLY;BYDAY={};COUNT={}",
        byday.join(","),
        recurrence.total_sessions()
    )
}

/// Full iCalendar text block: `DTSTART;TZID=...` followed by the `RRULE` line.
pub fn to_ical(recurrence: &RecurrenceSpec, start_date: NaiveDate, time: NaiveTime, timezone: Tz) -> String {
    let dtstart = start_date.and_time(time).format("%Y%m%dT%H%M%S");
    format!(
        "DTSTART;TZID={}:{}\nRRULE:{}",
        timezone.name(),
        dtstart,
        to_rrule(recurrence)
    )
}

/// Expand the recurrence with `rrule` and return wall-clock start times in
/// `timezone`.
///
/// # Errors
/// Returns `ValidationError::InvalidTime` if the rule text is rejected, for
/// example when the start time falls in a DST gap.
pub fn expand(
    recurrence: &RecurrenceSpec,
    start_date: NaiveDate,
    time: NaiveTime,
    timezone: Tz,
) -> Result<Vec<NaiveDateTime>, ValidationError> {
    let text = to_ical(recurrence, start_date, time, timezone);
    let rrule_set: RRuleSet = text
        .parse()
        .map_err(|e| ValidationError::InvalidTime(format!("{}", e)))?;

    let limit = u16::try_from(recurrence.total_sessions()).map_err(|_| ValidationError::TooManySessions {
        max: MAX_TOTAL_SESSIONS,
        got: recurrence.total_sessions(),
    })?;
    let instances = rrule_set.all(limit);

    Ok(instances
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&timezone).naive_local())
        .collect())
}
