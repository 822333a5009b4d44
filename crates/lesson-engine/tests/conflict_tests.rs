//! Tests for teacher/student double-booking detection.

use chrono::{NaiveDate, NaiveTime};
use lesson_engine::{
    compute_end_date, find_conflict, find_conflicts, generate_sessions, ConflictQuery,
    ConflictReason, Participants, RecurrenceSpec, Schedule, ScheduleId, Session, StudentId,
    TeacherId, WeekdayName,
};

use WeekdayName::{Monday, Saturday};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

/// Helper to build a persisted schedule starting on `start`.
fn schedule(
    id: ScheduleId,
    teacher: &str,
    participants: Participants,
    weekday: WeekdayName,
    total: u32,
    start: NaiveDate,
    time: NaiveTime,
) -> Schedule {
    let recurrence = RecurrenceSpec::new(vec![weekday], total).unwrap();
    Schedule {
        id: Some(id),
        subject: "Piano".to_string(),
        participants,
        teacher_id: TeacherId::from(teacher),
        time,
        meeting_link: "https://meet.example/piano".to_string(),
        end_date: compute_end_date(&recurrence, start),
        recurrence,
        rescheduled: false,
    }
}

fn solo(student: &str) -> Participants {
    Participants::Individual {
        student: StudentId::from(student),
    }
}

fn pair(a: &str, b: &str) -> Participants {
    Participants::Dual {
        students: [StudentId::from(a), StudentId::from(b)],
    }
}

/// Four Monday sessions from 2025-01-20: 01-20, 01-27, 02-03, 02-10.
fn monday_candidates(time: NaiveTime) -> Vec<Session> {
    let spec = RecurrenceSpec::new(vec![Monday], 4).unwrap();
    generate_sessions(&spec, date(2025, 1, 20), time)
}

fn query<'a>(
    sessions: &'a [Session],
    teacher: &'a TeacherId,
    students: &'a [StudentId],
) -> ConflictQuery<'a> {
    ConflictQuery {
        sessions,
        time: at(10),
        teacher_id: teacher,
        student_ids: students,
        editing_id: None,
        editing_end_date: None,
    }
}

#[test]
fn teacher_double_booked_at_same_instant() {
    // Teacher T already teaches S1 on 2025-02-03 at 10:00.
    let existing = vec![schedule(1, "T", solo("S1"), Monday, 1, date(2025, 2, 3), at(10))];
    let sessions = monday_candidates(at(10));
    let teacher = TeacherId::from("T");
    let students = vec![StudentId::from("S2")];

    let conflict = find_conflict(&query(&sessions, &teacher, &students), &existing)
        .expect("teacher T is double-booked");

    assert_eq!(conflict.schedule.id, Some(1));
    assert_eq!(conflict.date, date(2025, 2, 3));
    assert_eq!(conflict.time, at(10));
    assert_eq!(conflict.reason, ConflictReason::Teacher(teacher.clone()));
}

#[test]
fn different_time_same_date_is_free() {
    let existing = vec![schedule(1, "T", solo("S1"), Monday, 1, date(2025, 2, 3), at(11))];
    let sessions = monday_candidates(at(10));
    let teacher = TeacherId::from("T");
    let students = vec![StudentId::from("S1")];

    assert!(find_conflict(&query(&sessions, &teacher, &students), &existing).is_none());
}

#[test]
fn different_date_same_time_is_free() {
    let existing = vec![schedule(1, "T", solo("S1"), Saturday, 1, date(2025, 2, 1), at(10))];
    let sessions = monday_candidates(at(10));
    let teacher = TeacherId::from("T");
    let students = vec![StudentId::from("S1")];

    assert!(find_conflict(&query(&sessions, &teacher, &students), &existing).is_none());
}

#[test]
fn unrelated_people_never_conflict() {
    let existing = vec![schedule(1, "U", solo("S9"), Monday, 4, date(2025, 1, 20), at(10))];
    let sessions = monday_candidates(at(10));
    let teacher = TeacherId::from("T");
    let students = vec![StudentId::from("S1")];

    assert!(find_conflict(&query(&sessions, &teacher, &students), &existing).is_none());
}

#[test]
fn student_double_booked_with_other_teacher() {
    let existing = vec![schedule(1, "U", solo("S1"), Monday, 1, date(2025, 1, 27), at(10))];
    let sessions = monday_candidates(at(10));
    let teacher = TeacherId::from("T");
    let students = vec![StudentId::from("S1")];

    let conflict = find_conflict(&query(&sessions, &teacher, &students), &existing).unwrap();
    assert_eq!(conflict.reason, ConflictReason::Student(StudentId::from("S1")));
    assert_eq!(conflict.date, date(2025, 1, 27));
}

#[test]
fn second_student_of_a_dual_batch_collides() {
    let existing = vec![schedule(1, "U", pair("S3", "S4"), Monday, 2, date(2025, 1, 20), at(10))];
    let sessions = monday_candidates(at(10));
    let teacher = TeacherId::from("T");
    let students = vec![StudentId::from("S4"), StudentId::from("S5")];

    let conflict = find_conflict(&query(&sessions, &teacher, &students), &existing).unwrap();
    assert_eq!(conflict.reason, ConflictReason::Student(StudentId::from("S4")));
}

#[test]
fn teacher_reported_before_student() {
    let existing = vec![schedule(1, "T", solo("S1"), Monday, 1, date(2025, 1, 20), at(10))];
    let sessions = monday_candidates(at(10));
    let teacher = TeacherId::from("T");
    let students = vec![StudentId::from("S1"), StudentId::from("S2")];

    // Same teacher and first student but a different end date: not the same batch.
    let conflict = find_conflict(&query(&sessions, &teacher, &students), &existing).unwrap();
    assert_eq!(conflict.reason, ConflictReason::Teacher(teacher.clone()));
}

#[test]
fn edited_record_never_conflicts_with_itself() {
    let existing = vec![schedule(7, "T", solo("S1"), Monday, 4, date(2025, 1, 20), at(10))];
    let sessions = monday_candidates(at(10));
    let teacher = TeacherId::from("T");
    let students = vec![StudentId::from("S1")];

    let mut q = query(&sessions, &teacher, &students);
    assert!(find_conflict(&q, &existing).is_some());

    q.editing_id = Some(7);
    assert!(find_conflict(&q, &existing).is_none());
}

#[test]
fn same_ongoing_batch_is_exempt() {
    // Schedule 7: teacher T, student S1, Saturdays 02-08 .. 03-01 at 10:00.
    let existing = vec![schedule(7, "T", solo("S1"), Saturday, 4, date(2025, 2, 8), at(10))];
    assert_eq!(existing[0].end_date, date(2025, 3, 1));

    // Re-submitted with an extra week, overlapping every earlier session.
    let longer = RecurrenceSpec::new(vec![Saturday], 5).unwrap();
    let sessions = generate_sessions(&longer, date(2025, 2, 8), at(10));
    let teacher = TeacherId::from("T");
    let students = vec![StudentId::from("S1")];

    let mut q = query(&sessions, &teacher, &students);
    q.editing_end_date = Some(date(2025, 3, 1));
    assert!(find_conflict(&q, &existing).is_none());

    // A different end date identifies a different batch.
    q.editing_end_date = Some(date(2025, 3, 8));
    assert!(find_conflict(&q, &existing).is_some());
}

#[test]
fn same_batch_needs_matching_first_student() {
    let existing = vec![schedule(7, "T", pair("S1", "S2"), Saturday, 4, date(2025, 2, 8), at(10))];
    let spec = RecurrenceSpec::new(vec![Saturday], 4).unwrap();
    let sessions = generate_sessions(&spec, date(2025, 2, 8), at(10));
    let teacher = TeacherId::from("T");
    let students = vec![StudentId::from("S2"), StudentId::from("S1")];

    let mut q = query(&sessions, &teacher, &students);
    q.editing_end_date = Some(date(2025, 3, 1));
    assert!(find_conflict(&q, &existing).is_some());
}

#[test]
fn first_conflict_short_circuits_in_session_order() {
    let existing = vec![
        schedule(1, "T", solo("S8"), Monday, 1, date(2025, 2, 10), at(10)),
        schedule(2, "U", solo("S1"), Monday, 1, date(2025, 1, 27), at(10)),
    ];
    let sessions = monday_candidates(at(10));
    let teacher = TeacherId::from("T");
    let students = vec![StudentId::from("S1")];
    let q = query(&sessions, &teacher, &students);

    // Session 2 (01-27) collides before session 4 (02-10).
    let first = find_conflict(&q, &existing).unwrap();
    assert_eq!(first.schedule.id, Some(2));

    let all = find_conflicts(&q, &existing);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], first);
    assert_eq!(all[1].schedule.id, Some(1));
    assert_eq!(all[1].date, date(2025, 2, 10));
}

#[test]
fn empty_inputs_have_no_conflicts() {
    let teacher = TeacherId::from("T");
    let students = vec![StudentId::from("S1")];
    let sessions = monday_candidates(at(10));

    assert!(find_conflict(&query(&sessions, &teacher, &students), &[]).is_none());
    let existing = vec![schedule(1, "T", solo("S1"), Monday, 4, date(2025, 1, 20), at(10))];
    assert!(find_conflict(&query(&[], &teacher, &students), &existing).is_none());
}
