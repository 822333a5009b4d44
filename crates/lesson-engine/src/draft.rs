//! Raw form input and its validation into schedules.
//!
//! Validation reports the first missing or malformed field before any session
//! is generated. A valid draft becomes a [`Schedule`] or [`GroupArrangement`]
//! whose end date comes from the inverter, never from the caller directly.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::clock::{split_12_hour, to_24_hour, Meridiem};
use crate::error::{Field, ValidationError};
use crate::generator::generate_sessions;
use crate::inverter::{compute_end_date, total_sessions_until};
use crate::model::{BatchType, GroupArrangement, Participants, Schedule, StudentId, TeacherId};
use crate::recurrence::{earliest_start, RecurrenceSpec};
use crate::weekday::WeekdayName;

/// How long a batch runs: a session count, or the week it should end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionLength {
    Count(u32),
    EndDate(NaiveDate),
}

/// Split 12-hour time input as entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInput {
    pub hour: u32,
    pub minute: u32,
    pub meridiem: Meridiem,
}

impl TimeInput {
    pub fn to_time(self) -> Result<NaiveTime, ValidationError> {
        to_24_hour(self.hour, self.minute, self.meridiem)
    }
}

impl From<NaiveTime> for TimeInput {
    fn from(time: NaiveTime) -> Self {
        let (hour, minute, meridiem) = split_12_hour(time);
        Self {
            hour,
            minute,
            meridiem,
        }
    }
}

/// Form state for an individual or dual batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDraft {
    pub subject: String,
    pub batch_type: BatchType,
    pub students: Vec<StudentId>,
    pub teacher_id: Option<TeacherId>,
    pub weekdays: Vec<WeekdayName>,
    pub time: Option<TimeInput>,
    pub meeting_link: String,
    pub length: Option<SessionLength>,
}

/// A validated draft: the schedule to persist and its start date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub schedule: Schedule,
    pub start_date: NaiveDate,
}

fn require_text(value: &str, field: Field) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Resolve weekdays and length into a recurrence anchored on the earliest
/// upcoming weekday from `today`.
fn resolve_recurrence(
    weekdays: &[WeekdayName],
    length: Option<SessionLength>,
    today: NaiveDate,
) -> Result<(RecurrenceSpec, NaiveDate), ValidationError> {
    if weekdays.is_empty() {
        return Err(ValidationError::MissingField(Field::Weekday));
    }
    let length = length.ok_or(ValidationError::MissingField(Field::EndDate))?;
    // RecurrenceSpec::new checks weekday count and distinctness.
    let start_date = earliest_start(weekdays, today);
    let total = match length {
        SessionLength::Count(n) => n,
        SessionLength::EndDate(end) => total_sessions_until(weekdays, start_date, end)?,
    };
    let recurrence = RecurrenceSpec::new(weekdays.to_vec(), total)?;
    Ok((recurrence, start_date))
}

impl ScheduleDraft {
    pub fn new(batch_type: BatchType) -> Self {
        Self {
            subject: String::new(),
            batch_type,
            students: Vec::new(),
            teacher_id: None,
            weekdays: Vec::new(),
            time: None,
            meeting_link: String::new(),
            length: None,
        }
    }

    /// Pre-populate a draft from a persisted schedule for editing.
    pub fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            subject: schedule.subject.clone(),
            batch_type: schedule.participants.batch_type(),
            students: schedule.participants.student_ids().to_vec(),
            teacher_id: Some(schedule.teacher_id.clone()),
            weekdays: schedule.recurrence.weekdays().to_vec(),
            time: Some(schedule.time.into()),
            meeting_link: schedule.meeting_link.clone(),
            length: Some(SessionLength::Count(schedule.recurrence.total_sessions())),
        }
    }

    fn participants(&self) -> Result<Participants, ValidationError> {
        match self.batch_type {
            BatchType::Individual => match self.students.as_slice() {
                [] => Err(ValidationError::MissingField(Field::Student)),
                [student] => Ok(Participants::Individual {
                    student: student.clone(),
                }),
                more => Err(ValidationError::StudentCount {
                    expected: 1,
                    got: more.len(),
                }),
            },
            BatchType::Dual => match self.students.as_slice() {
                [] => Err(ValidationError::MissingField(Field::Student)),
                [a, b] if a == b => Err(ValidationError::DuplicateStudent),
                [a, b] => Ok(Participants::Dual {
                    students: [a.clone(), b.clone()],
                }),
                other => Err(ValidationError::StudentCount {
                    expected: 2,
                    got: other.len(),
                }),
            },
            BatchType::Group => Err(ValidationError::MissingField(Field::GroupName)),
        }
    }

    /// Check every field and build the schedule, anchored on `today`.
    ///
    /// # Errors
    /// Returns the first `ValidationError` found, in form order: subject,
    /// students, teacher, weekdays, time, meeting link, then length.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidDraft, ValidationError> {
        let subject = require_text(&self.subject, Field::Subject)?;
        let participants = self.participants()?;
        let teacher_id = self
            .teacher_id
            .clone()
            .ok_or(ValidationError::MissingField(Field::Teacher))?;
        if self.weekdays.is_empty() {
            return Err(ValidationError::MissingField(Field::Weekday));
        }
        let time = self
            .time
            .ok_or(ValidationError::MissingField(Field::Time))?
            .to_time()?;
        let meeting_link = require_text(&self.meeting_link, Field::MeetingLink)?;
        let (recurrence, start_date) = resolve_recurrence(&self.weekdays, self.length, today)?;

        let end_date = compute_end_date(&recurrence, start_date);
        Ok(ValidDraft {
            schedule: Schedule {
                id: None,
                subject,
                participants,
                teacher_id,
                time,
                meeting_link,
                recurrence,
                end_date,
                rescheduled: false,
            },
            start_date,
        })
    }
}

/// Form state for a group batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupDraft {
    pub group_name: String,
    pub class_link: String,
    pub teacher_id: Option<TeacherId>,
    pub students: BTreeSet<StudentId>,
    pub weekdays: Vec<WeekdayName>,
    pub time: Option<TimeInput>,
    pub length: Option<SessionLength>,
}

impl GroupDraft {
    pub fn from_group(group: &GroupArrangement) -> Self {
        Self {
            group_name: group.group_name.clone(),
            class_link: group.class_link.clone(),
            teacher_id: Some(group.teacher_id.clone()),
            students: group.students.clone(),
            weekdays: group.recurrence.weekdays().to_vec(),
            time: Some(group.time.into()),
            length: Some(SessionLength::Count(group.recurrence.total_sessions())),
        }
    }

    /// Check every field and build the arrangement with its sessions.
    pub fn validate(&self, today: NaiveDate) -> Result<GroupArrangement, ValidationError> {
        let group_name = require_text(&self.group_name, Field::GroupName)?;
        let teacher_id = self
            .teacher_id
            .clone()
            .ok_or(ValidationError::MissingField(Field::Teacher))?;
        if self.students.is_empty() {
            return Err(ValidationError::MissingField(Field::Student));
        }
        if self.weekdays.is_empty() {
            return Err(ValidationError::MissingField(Field::Weekday));
        }
        let time = self
            .time
            .ok_or(ValidationError::MissingField(Field::Time))?
            .to_time()?;
        let class_link = require_text(&self.class_link, Field::MeetingLink)?;
        let (recurrence, start_date) = resolve_recurrence(&self.weekdays, self.length, today)?;

        Ok(GroupArrangement {
            id: None,
            group_name,
            class_link,
            teacher_id,
            students: self.students.clone(),
            end_date: compute_end_date(&recurrence, start_date),
            sessions: generate_sessions(&recurrence, start_date, time),
            recurrence,
            time,
        })
    }
}
