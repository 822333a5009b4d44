//! Detect teacher or student double-booking between candidate sessions and the
//! existing schedule set.
//!
//! Sessions are instants: two sessions collide only on identical date and time.
//! No duration overlap is modelled.

use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::generator::Session;
use crate::model::{Schedule, ScheduleId, StudentId, TeacherId};

/// Who is double-booked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    Teacher(TeacherId),
    Student(StudentId),
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::Teacher(id) => write!(f, "teacher {} is already booked", id),
            ConflictReason::Student(id) => write!(f, "student {} is already booked", id),
        }
    }
}

/// A collision between one candidate session and one existing schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict<'a> {
    pub schedule: &'a Schedule,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: ConflictReason,
}

/// The proposed batch being checked.
#[derive(Debug, Clone)]
pub struct ConflictQuery<'a> {
    pub sessions: &'a [Session],
    pub time: NaiveTime,
    pub teacher_id: &'a TeacherId,
    pub student_ids: &'a [StudentId],
    /// The record being edited; never conflicts with itself.
    pub editing_id: Option<ScheduleId>,
    /// End date identifying the batch being created or edited.
    pub editing_end_date: Option<NaiveDate>,
}

impl ConflictQuery<'_> {
    fn is_exempt(&self, existing: &Schedule) -> bool {
        if self.editing_id.is_some() && existing.id == self.editing_id {
            return true;
        }
        // Same ongoing batch: its own sessions may coexist.
        existing.teacher_id == *self.teacher_id
            && self.student_ids.first() == Some(existing.participants.primary())
            && Some(existing.end_date) == self.editing_end_date
    }

    fn reason_against(&self, existing: &Schedule) -> Option<ConflictReason> {
        if existing.teacher_id == *self.teacher_id {
            return Some(ConflictReason::Teacher(existing.teacher_id.clone()));
        }
        self.student_ids
            .iter()
            .find(|id| existing.participants.contains(id))
            .map(|id| ConflictReason::Student(id.clone()))
    }
}

/// Non-exempt schedules paired with the dates they hold a session at `time`.
fn busy_dates<'a>(query: &ConflictQuery<'_>, existing: &'a [Schedule]) -> Vec<(&'a Schedule, HashSet<NaiveDate>)> {
    existing
        .iter()
        .filter(|e| e.time == query.time && !query.is_exempt(e))
        .map(|e| (e, e.sessions().into_iter().map(|s| s.date).collect()))
        .collect()
}

/// Return the first collision, scanning candidate sessions in order and the
/// existing schedules in order for each.
///
/// A collision needs an identical date and time plus either the same teacher
/// or a shared student. The record named by `editing_id` and any schedule of the
/// same ongoing batch (same teacher, same first student, same end date) are
/// skipped.
pub fn find_conflict<'a>(query: &ConflictQuery<'_>, existing: &'a [Schedule]) -> Option<Conflict<'a>> {
    let busy = busy_dates(query, existing);
    for session in query.sessions {
        for (schedule, dates) in &busy {
            if !dates.contains(&session.date) {
                continue;
            }
            if let Some(reason) = query.reason_against(schedule) {
                return Some(Conflict {
                    schedule: *schedule,
                    date: session.date,
                    time: query.time,
                    reason,
                });
            }
        }
    }
    None
}

/// Every collision, one per (candidate session, existing schedule) pair.
///
/// Same exemptions and ordering as [`find_conflict`]; its first element is
/// always what `find_conflict` returns.
pub fn find_conflicts<'a>(query: &ConflictQuery<'_>, existing: &'a [Schedule]) -> Vec<Conflict<'a>> {
    let busy = busy_dates(query, existing);
    let mut conflicts = Vec::new();

    for session in query.sessions {
        for (schedule, dates) in &busy {
            if !dates.contains(&session.date) {
                continue;
            }
            if let Some(reason) = query.reason_against(schedule) {
                conflicts.push(Conflict {
                    schedule: *schedule,
                    date: session.date,
                    time: query.time,
                    reason,
                });
            }
        }
    }

    conflicts
}
