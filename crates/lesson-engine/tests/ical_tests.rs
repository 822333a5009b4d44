//! Tests for RFC 5545 export and its agreement with the session generator.

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use lesson_engine::ical::{expand, to_ical, to_rrule};
use lesson_engine::{generate_sessions, RecurrenceSpec, WeekdayName};

use WeekdayName::{Friday, Monday, Tuesday, Wednesday};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn rrule_lists_weekdays_and_count() {
    let spec = RecurrenceSpec::new(vec![Monday, Wednesday], 5).unwrap();
    assert_eq!(to_rrule(&spec), "FREQ=WEEKLY;BYDAY=MO,WE;COUNT=5");
}

#[test]
fn ical_block_carries_zone_and_start() {
    let spec = RecurrenceSpec::new(vec![Friday], 2).unwrap();
    let text = to_ical(&spec, date(2025, 1, 3), at(17, 30), chrono_tz::Europe::London);
    assert_eq!(
        text,
        "DTSTART;TZID=Europe/London:20250103T173000\nRRULE:FREQ=WEEKLY;BYDAY=FR;COUNT=2"
    );
}

#[test]
fn rrule_expansion_matches_generator() {
    let spec = RecurrenceSpec::new(vec![Monday, Wednesday], 5).unwrap();
    let start = date(2025, 1, 6);
    let time = at(10, 0);

    let generated: Vec<_> = generate_sessions(&spec, start, time)
        .into_iter()
        .map(|s| s.date.and_time(s.time))
        .collect();
    let expanded = expand(&spec, start, time, Tz::UTC).unwrap();

    assert_eq!(expanded, generated);
}

#[test]
fn rrule_expansion_keeps_wall_clock_across_dst() {
    // New York springs forward on 2025-03-09; lessons stay at 18:00 local.
    let spec = RecurrenceSpec::new(vec![Tuesday], 3).unwrap();
    let start = date(2025, 3, 4);
    let expanded = expand(&spec, start, at(18, 0), chrono_tz::America::New_York).unwrap();

    assert_eq!(
        expanded,
        vec![
            date(2025, 3, 4).and_time(at(18, 0)),
            date(2025, 3, 11).and_time(at(18, 0)),
            date(2025, 3, 18).and_time(at(18, 0)),
        ]
    );
}
