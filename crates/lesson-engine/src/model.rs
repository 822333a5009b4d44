//! Batches and the people in them.
//!
//! A [`Schedule`] is an individual or dual batch whose sessions are derived on
//! read from its recurrence and end date. A [`GroupArrangement`] keeps its
//! persisted session list.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::generator::Session;
use crate::inverter::{sessions_from_end_date, start_from_end_date};
use crate::recurrence::RecurrenceSpec;
use crate::weekday::WeekdayName;

/// Storage-assigned record id.
pub type ScheduleId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeacherId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TeacherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&str> for TeacherId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchType {
    Individual,
    Dual,
    Group,
}

impl fmt::Display for BatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BatchType::Individual => "individual",
            BatchType::Dual => "dual",
            BatchType::Group => "group",
        })
    }
}

/// Who a schedule teaches: one student, or a pair sharing the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "batch_type", rename_all = "lowercase")]
pub enum Participants {
    Individual { student: StudentId },
    Dual { students: [StudentId; 2] },
}

impl Participants {
    pub fn batch_type(&self) -> BatchType {
        match self {
            Participants::Individual { .. } => BatchType::Individual,
            Participants::Dual { .. } => BatchType::Dual,
        }
    }

    pub fn student_ids(&self) -> &[StudentId] {
        match self {
            Participants::Individual { student } => std::slice::from_ref(student),
            Participants::Dual { students } => students,
        }
    }

    /// The first listed student.
    pub fn primary(&self) -> &StudentId {
        &self.student_ids()[0]
    }

    pub fn contains(&self, student: &StudentId) -> bool {
        self.student_ids().contains(student)
    }
}

/// One individual or dual batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ScheduleId>,
    pub subject: String,
    #[serde(flatten)]
    pub participants: Participants,
    pub teacher_id: TeacherId,
    #[serde(with = "crate::clock::hhmm")]
    pub time: NaiveTime,
    pub meeting_link: String,
    pub recurrence: RecurrenceSpec,
    /// First day of the final week, as produced by the inverter.
    pub end_date: NaiveDate,
    #[serde(default)]
    pub rescheduled: bool,
}

impl Schedule {
    pub fn first_day(&self) -> WeekdayName {
        self.recurrence.first_day()
    }

    pub fn second_day(&self) -> Option<WeekdayName> {
        self.recurrence.second_day()
    }

    pub fn start_date(&self) -> NaiveDate {
        start_from_end_date(&self.recurrence, self.end_date)
    }

    pub fn sessions(&self) -> Vec<Session> {
        sessions_from_end_date(&self.recurrence, self.end_date, self.time)
    }
}

/// One group batch. Sessions are stored, not regenerated on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupArrangement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ScheduleId>,
    pub group_name: String,
    pub class_link: String,
    pub teacher_id: TeacherId,
    pub students: BTreeSet<StudentId>,
    pub recurrence: RecurrenceSpec,
    #[serde(with = "crate::clock::hhmm")]
    pub time: NaiveTime,
    pub end_date: NaiveDate,
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentEntry {
    pub id: StudentId,
    pub name: String,
    pub batch_type: BatchType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherEntry {
    pub id: TeacherId,
    pub name: String,
}

/// Display names and batch-type eligibility for everyone who can be scheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub students: Vec<StudentEntry>,
    #[serde(default)]
    pub teachers: Vec<TeacherEntry>,
}

impl Directory {
    /// Students enrolled for `batch_type`.
    pub fn selectable_students(&self, batch_type: BatchType) -> impl Iterator<Item = &StudentEntry> {
        self.students
            .iter()
            .filter(move |s| s.batch_type == batch_type)
    }

    /// Check `students` against the enrolment list. An empty directory
    /// restricts nobody.
    ///
    /// # Errors
    /// Returns `ValidationError::IneligibleStudent` for the first student not
    /// enrolled for `batch_type`.
    pub fn check_eligible<'a>(
        &self,
        batch_type: BatchType,
        students: impl IntoIterator<Item = &'a StudentId>,
    ) -> Result<(), ValidationError> {
        if self.students.is_empty() {
            return Ok(());
        }
        for student in students {
            if !self.selectable_students(batch_type).any(|s| &s.id == student) {
                return Err(ValidationError::IneligibleStudent {
                    student: student.clone(),
                    batch_type,
                });
            }
        }
        Ok(())
    }

    pub fn student_name(&self, id: &StudentId) -> Option<&str> {
        self.students
            .iter()
            .find(|s| &s.id == id)
            .map(|s| s.name.as_str())
    }

    pub fn teacher_name(&self, id: &TeacherId) -> Option<&str> {
        self.teachers
            .iter()
            .find(|t| &t.id == id)
            .map(|t| t.name.as_str())
    }
}
