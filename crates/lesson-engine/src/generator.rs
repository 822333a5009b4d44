//! Session generation -- expands a weekly recurrence into concrete dated sessions.
//!
//! Weeks are seven-day windows opening on the start date. Each window yields one
//! session per configured weekday; the final window may be cut short when the
//! session count is not a multiple of the weekdays per week.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrenceSpec;
use crate::weekday::{date_for_weekday_in_week, WeekdayName};

/// One concrete dated and timed occurrence of a batch's lessons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub date: NaiveDate,
    pub weekday: WeekdayName,
    pub session_number: u32,
    #[serde(with = "crate::clock::hhmm")]
    pub time: NaiveTime,
}

/// Expand `recurrence` forward from `start_date`.
///
/// Returns exactly `recurrence.total_sessions()` sessions, numbered from 1 in
/// date order.
pub fn generate_sessions(
    recurrence: &RecurrenceSpec,
    start_date: NaiveDate,
    time: NaiveTime,
) -> Vec<Session> {
    let total = recurrence.total_sessions() as usize;
    assert!(total >= 1, "recurrence needs at least one session");

    let mut dated: Vec<(NaiveDate, WeekdayName)> = Vec::with_capacity(
        recurrence.total_weeks() as usize * recurrence.weekdays().len(),
    );
    for week in 0..recurrence.total_weeks() {
        let week_base = start_date + Duration::weeks(i64::from(week));
        let mut in_week: Vec<(NaiveDate, WeekdayName)> = recurrence
            .weekdays()
            .iter()
            .map(|&day| (date_for_weekday_in_week(week_base, day), day))
            .collect();
        // A weekday listed first can still land later in the window.
        in_week.sort_by_key(|&(date, _)| date);
        dated.extend(in_week);
    }
    dated.truncate(total);

    dated
        .into_iter()
        .zip(1u32..)
        .map(|((date, weekday), session_number)| Session {
            date,
            weekday,
            session_number,
            time,
        })
        .collect()
}

/// Generate sessions anchored on the earliest upcoming configured weekday,
/// counting `today` if it qualifies.
pub fn plan_sessions(recurrence: &RecurrenceSpec, today: NaiveDate, time: NaiveTime) -> Vec<Session> {
    generate_sessions(recurrence, recurrence.earliest_start(today), time)
}
