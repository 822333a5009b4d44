//! Session count <-> end date inversion.
//!
//! The end date of a recurrence is the first day of its last week, not the
//! date of its final session. Regenerating from a stored end date walks back
//! to the start date and expands forward again.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::error::ValidationError;
use crate::generator::{generate_sessions, Session};
use crate::recurrence::{RecurrenceSpec, MAX_TOTAL_SESSIONS};
use crate::weekday::WeekdayName;

/// `start_date + (total_weeks - 1) * 7 days`.
pub fn compute_end_date(recurrence: &RecurrenceSpec, start_date: NaiveDate) -> NaiveDate {
    start_date + Duration::weeks(i64::from(recurrence.total_weeks() - 1))
}

/// Inverse of [`compute_end_date`].
pub fn start_from_end_date(recurrence: &RecurrenceSpec, end_date: NaiveDate) -> NaiveDate {
    end_date - Duration::weeks(i64::from(recurrence.total_weeks() - 1))
}

/// Rebuild the session list of a stored recurrence from its end date.
pub fn sessions_from_end_date(
    recurrence: &RecurrenceSpec,
    end_date: NaiveDate,
    time: NaiveTime,
) -> Vec<Session> {
    generate_sessions(recurrence, start_from_end_date(recurrence, end_date), time)
}

/// Session count that makes a recurrence starting on `start_date` end in the
/// week opening on or before `end_date`.
///
/// # Errors
/// Returns `ValidationError::EndBeforeStart` when `end_date < start_date`, and
/// `ValidationError::TooManySessions` (reporting `u32::MAX`) when the count
/// does not fit a `u32`.
pub fn total_sessions_until(
    weekdays: &[WeekdayName],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<u32, ValidationError> {
    if end_date < start_date {
        return Err(ValidationError::EndBeforeStart {
            start: start_date,
            end: end_date,
        });
    }
    let weeks = (end_date - start_date).num_days() / 7 + 1;
    let total = weeks.saturating_mul(weekdays.len() as i64);
    u32::try_from(total).map_err(|_| ValidationError::TooManySessions {
        max: MAX_TOTAL_SESSIONS,
        got: u32::MAX,
    })
}
