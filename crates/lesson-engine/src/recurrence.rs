//! The weekly recurrence pattern a batch follows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::weekday::{next_occurrence, WeekdayName};

/// Upper bound on `total_sessions`. Also the largest expansion `rrule` accepts,
/// and keeps every generated date well inside chrono's range.
pub const MAX_TOTAL_SESSIONS: u32 = u16::MAX as u32;

/// One or two distinct weekdays per week and a total session count.
///
/// Only constructible through [`RecurrenceSpec::new`] (deserialization routes
/// through it too), so `sessions_per_week() == weekdays().len()` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RecurrenceWire", into = "RecurrenceWire")]
pub struct RecurrenceSpec {
    weekdays: Vec<WeekdayName>,
    total_sessions: u32,
}

#[derive(Serialize, Deserialize)]
struct RecurrenceWire {
    weekdays: Vec<WeekdayName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sessions_per_week: Option<u32>,
    total_sessions: u32,
}

impl RecurrenceSpec {
    /// Build a recurrence, rejecting empty, oversized or repeated weekday lists
    /// and a session count of zero or above [`MAX_TOTAL_SESSIONS`].
    pub fn new(weekdays: Vec<WeekdayName>, total_sessions: u32) -> Result<Self, ValidationError> {
        match weekdays.as_slice() {
            [] => return Err(ValidationError::MissingField(crate::error::Field::Weekday)),
            [_] => {}
            [a, b] if a == b => return Err(ValidationError::DuplicateWeekday),
            [_, _] => {}
            _ => return Err(ValidationError::WeekdayCount(weekdays.len())),
        }
        if total_sessions == 0 {
            return Err(ValidationError::ZeroSessions);
        }
        if total_sessions > MAX_TOTAL_SESSIONS {
            return Err(ValidationError::TooManySessions {
                max: MAX_TOTAL_SESSIONS,
                got: total_sessions,
            });
        }
        Ok(Self {
            weekdays,
            total_sessions,
        })
    }

    pub fn weekdays(&self) -> &[WeekdayName] {
        &self.weekdays
    }

    pub fn first_day(&self) -> WeekdayName {
        self.weekdays[0]
    }

    pub fn second_day(&self) -> Option<WeekdayName> {
        self.weekdays.get(1).copied()
    }

    pub fn sessions_per_week(&self) -> u32 {
        self.weekdays.len() as u32
    }

    pub fn total_sessions(&self) -> u32 {
        self.total_sessions
    }

    /// Number of weeks needed to fit every session: `ceil(total / per_week)`.
    pub fn total_weeks(&self) -> u32 {
        self.total_sessions.div_ceil(self.sessions_per_week())
    }

    /// Earliest upcoming date, today included, that falls on any configured weekday.
    pub fn earliest_start(&self, today: NaiveDate) -> NaiveDate {
        earliest_start(&self.weekdays, today)
    }
}

/// Minimum of `next_occurrence(today, w, true)` over `weekdays`.
///
/// # Panics
/// Panics if `weekdays` is empty.
pub fn earliest_start(weekdays: &[WeekdayName], today: NaiveDate) -> NaiveDate {
    assert!(!weekdays.is_empty(), "recurrence needs at least one weekday");
    weekdays
        .iter()
        .map(|&day| next_occurrence(today, day, true))
        .min()
        .unwrap_or(today)
}

impl TryFrom<RecurrenceWire> for RecurrenceSpec {
    type Error = ValidationError;

    fn try_from(wire: RecurrenceWire) -> Result<Self, Self::Error> {
        if let Some(declared) = wire.sessions_per_week {
            if declared as usize != wire.weekdays.len() {
                return Err(ValidationError::SessionsPerWeekMismatch {
                    declared,
                    listed: wire.weekdays.len(),
                });
            }
        }
        Self::new(wire.weekdays, wire.total_sessions)
    }
}

impl From<RecurrenceSpec> for RecurrenceWire {
    fn from(spec: RecurrenceSpec) -> Self {
        Self {
            sessions_per_week: Some(spec.sessions_per_week()),
            weekdays: spec.weekdays,
            total_sessions: spec.total_sessions,
        }
    }
}
