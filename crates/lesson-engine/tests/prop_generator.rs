//! Property-based tests for session generation and inversion using proptest.
//!
//! These tests verify invariants that should hold for *any* valid recurrence,
//! not just the specific examples in `generator_tests.rs`.

use chrono::{Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use proptest::prelude::*;
use lesson_engine::{
    compute_end_date, find_conflict, generate_sessions, ical, plan_sessions, start_from_end_date,
    weekday_of, ConflictQuery, Participants, RecurrenceSpec, Schedule, StudentId, TeacherId,
    WeekdayName,
};

// ---------------------------------------------------------------------------
// Strategies — generate valid recurrence components
// ---------------------------------------------------------------------------

fn arb_weekday() -> impl Strategy<Value = WeekdayName> {
    (0u32..7).prop_map(WeekdayName::from_index)
}

/// One weekday, or two distinct ones in either order.
fn arb_weekdays() -> impl Strategy<Value = Vec<WeekdayName>> {
    prop_oneof![
        arb_weekday().prop_map(|d| vec![d]),
        (arb_weekday(), 1u32..7).prop_map(|(d, offset)| {
            vec![d, WeekdayName::from_index(d.index() + offset)]
        }),
    ]
}

fn arb_recurrence() -> impl Strategy<Value = RecurrenceSpec> {
    (arb_weekdays(), 1u32..=60).prop_map(|(days, total)| RecurrenceSpec::new(days, total).unwrap())
}

/// A date in the 2024-2027 range.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..(4 * 365)).prop_map(|offset| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset))
}

fn arb_time() -> impl Strategy<Value = NaiveTime> {
    (7u32..=21, prop_oneof![Just(0u32), Just(30u32)])
        .prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: exactly total_sessions sessions
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn count_matches_total_sessions(spec in arb_recurrence(), today in arb_date(), time in arb_time()) {
        let sessions = plan_sessions(&spec, today, time);
        prop_assert_eq!(sessions.len(), spec.total_sessions() as usize);
    }
}

// ---------------------------------------------------------------------------
// Property 2: every session falls on its recorded weekday, which is configured
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn session_weekday_matches_date(spec in arb_recurrence(), today in arb_date(), time in arb_time()) {
        for session in plan_sessions(&spec, today, time) {
            prop_assert_eq!(weekday_of(session.date), session.weekday);
            prop_assert!(spec.weekdays().contains(&session.weekday));
            prop_assert_eq!(session.time, time);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: dates strictly increase with session number, numbers are 1..=n
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn dates_increase_with_session_number(spec in arb_recurrence(), start in arb_date(), time in arb_time()) {
        let sessions = generate_sessions(&spec, start, time);
        for (i, session) in sessions.iter().enumerate() {
            prop_assert_eq!(session.session_number as usize, i + 1);
        }
        for pair in sessions.windows(2) {
            prop_assert!(
                pair[0].date < pair[1].date,
                "sessions out of order: {} then {}",
                pair[0].date,
                pair[1].date
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: first session is today or later, within the first week
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn first_session_is_earliest_upcoming(spec in arb_recurrence(), today in arb_date()) {
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let first = plan_sessions(&spec, today, time)[0].date;
        prop_assert!(first >= today);
        prop_assert!(first - today < Duration::days(7));
        prop_assert_eq!(first, spec.earliest_start(today));
    }
}

// ---------------------------------------------------------------------------
// Property 5: end date inversion round-trips through regeneration
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn end_date_round_trip(spec in arb_recurrence(), today in arb_date(), time in arb_time()) {
        let start = spec.earliest_start(today);
        let original = generate_sessions(&spec, start, time);
        let end = compute_end_date(&spec, start);

        let rebuilt_start = start_from_end_date(&spec, end);
        prop_assert_eq!(rebuilt_start, start);

        let regenerated = generate_sessions(&spec, rebuilt_start, time);
        let original_days: Vec<_> = original.iter().map(|s| s.weekday).collect();
        let regenerated_days: Vec<_> = regenerated.iter().map(|s| s.weekday).collect();
        prop_assert_eq!(regenerated.len(), original.len());
        prop_assert_eq!(regenerated_days, original_days);

        // The end date opens the week holding the last session.
        let last = original.last().unwrap().date;
        prop_assert!(end <= last && last - end < Duration::days(7));
    }
}

// ---------------------------------------------------------------------------
// Property 6: the rrule crate agrees with the generator
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

    #[test]
    fn rrule_agrees_with_generator(spec in arb_recurrence(), today in arb_date(), time in arb_time()) {
        let start = spec.earliest_start(today);
        let generated: Vec<_> = generate_sessions(&spec, start, time)
            .into_iter()
            .map(|s| s.date.and_time(s.time))
            .collect();
        let expanded = ical::expand(&spec, start, time, Tz::UTC).unwrap();
        prop_assert_eq!(expanded, generated);
    }
}

// ---------------------------------------------------------------------------
// Property 7: a persisted schedule never conflicts with its own re-submission
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn no_self_conflict(spec in arb_recurrence(), today in arb_date(), time in arb_time()) {
        let start = spec.earliest_start(today);
        let teacher = TeacherId::from("T");
        let student = StudentId::from("S1");
        let existing = vec![Schedule {
            id: Some(1),
            subject: "Cello".to_string(),
            participants: Participants::Individual { student: student.clone() },
            teacher_id: teacher.clone(),
            time,
            meeting_link: "https://meet.example/cello".to_string(),
            end_date: compute_end_date(&spec, start),
            recurrence: spec.clone(),
            rescheduled: false,
        }];
        let sessions = generate_sessions(&spec, start, time);
        let students = [student];

        let by_id = ConflictQuery {
            sessions: &sessions,
            time,
            teacher_id: &teacher,
            student_ids: &students,
            editing_id: Some(1),
            editing_end_date: None,
        };
        prop_assert!(find_conflict(&by_id, &existing).is_none());

        let by_batch = ConflictQuery {
            editing_id: None,
            editing_end_date: Some(existing[0].end_date),
            ..by_id.clone()
        };
        prop_assert!(find_conflict(&by_batch, &existing).is_none());

        let unexempt = ConflictQuery {
            editing_id: None,
            editing_end_date: None,
            ..by_id
        };
        prop_assert!(find_conflict(&unexempt, &existing).is_some());
    }
}
