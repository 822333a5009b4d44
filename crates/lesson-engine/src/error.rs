//! Error types for lesson-engine operations.

use thiserror::Error;

use crate::conflict::ConflictReason;
use crate::model::{BatchType, ScheduleId, StudentId, TeacherId};

/// A form field that can be missing from a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Subject,
    Student,
    Teacher,
    Weekday,
    Time,
    MeetingLink,
    EndDate,
    GroupName,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Subject => "subject",
            Field::Student => "student",
            Field::Teacher => "teacher",
            Field::Weekday => "weekday",
            Field::Time => "time",
            Field::MeetingLink => "meeting link",
            Field::EndDate => "end date or session count",
            Field::GroupName => "group name",
        };
        f.write_str(name)
    }
}

/// Rejected input, reported before any session is generated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(Field),

    #[error("A recurrence needs one or two weekdays, got {0}")]
    WeekdayCount(usize),

    #[error("Unknown weekday: {0}")]
    UnknownWeekday(String),

    #[error("Weekdays must be distinct")]
    DuplicateWeekday,

    #[error("sessions_per_week is {declared} but {listed} weekday(s) were given")]
    SessionsPerWeekMismatch { declared: u32, listed: usize },

    #[error("Total sessions must be at least 1")]
    ZeroSessions,

    #[error("Total sessions must be at most {max}, got {got}")]
    TooManySessions { max: u32, got: u32 },

    #[error("Expected {expected} student(s), got {got}")]
    StudentCount { expected: usize, got: usize },

    #[error("A dual batch needs two different students")]
    DuplicateStudent,

    #[error("Student {student} is not enrolled for {batch_type} batches")]
    IneligibleStudent {
        student: StudentId,
        batch_type: BatchType,
    },

    #[error("End date {end} is before the first session on {start}")]
    EndBeforeStart {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Invalid time: {0}")]
    InvalidTime(String),
}

/// Failure reported by the storage collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record {0} not found")]
    NotFound(ScheduleId),

    #[error("Storage request failed: {0}")]
    Request(String),
}

/// Top-level error for the booking lifecycle.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Schedule conflicts with an existing batch on {date} at {}: {reason}", .time.format("%H:%M"))]
    Conflict {
        schedule: Option<ScheduleId>,
        teacher_id: TeacherId,
        date: chrono::NaiveDate,
        time: chrono::NaiveTime,
        reason: ConflictReason,
    },

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Unknown schedule: {0}")]
    UnknownSchedule(ScheduleId),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
