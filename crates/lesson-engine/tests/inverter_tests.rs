//! Tests for session count <-> end date inversion.

use chrono::{NaiveDate, NaiveTime};
use lesson_engine::error::ValidationError;
use lesson_engine::{
    compute_end_date, generate_sessions, sessions_from_end_date, start_from_end_date,
    total_sessions_until, RecurrenceSpec, WeekdayName,
};

use WeekdayName::{Monday, Saturday, Wednesday};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn four_pm() -> NaiveTime {
    NaiveTime::from_hms_opt(16, 0, 0).unwrap()
}

#[test]
fn end_date_is_start_of_last_week() {
    let spec = RecurrenceSpec::new(vec![Monday], 4).unwrap();
    assert_eq!(compute_end_date(&spec, date(2025, 1, 6)), date(2025, 1, 27));
}

#[test]
fn end_date_is_not_the_last_session_date() {
    // Six sessions Mon/Wed: last session is Wednesday 01-22 but the end date
    // stays on the week's opening Monday.
    let spec = RecurrenceSpec::new(vec![Monday, Wednesday], 6).unwrap();
    let start = date(2025, 1, 6);
    let sessions = generate_sessions(&spec, start, four_pm());

    assert_eq!(compute_end_date(&spec, start), date(2025, 1, 20));
    assert_eq!(sessions.last().unwrap().date, date(2025, 1, 22));
}

#[test]
fn single_week_ends_where_it_starts() {
    let spec = RecurrenceSpec::new(vec![Monday, Wednesday], 2).unwrap();
    assert_eq!(compute_end_date(&spec, date(2025, 1, 6)), date(2025, 1, 6));
}

#[test]
fn start_reconstructs_from_end() {
    let spec = RecurrenceSpec::new(vec![Monday, Wednesday], 5).unwrap();
    let start = date(2025, 1, 6);
    let end = compute_end_date(&spec, start);
    assert_eq!(start_from_end_date(&spec, end), start);
}

#[test]
fn regeneration_from_end_matches_original() {
    let spec = RecurrenceSpec::new(vec![Saturday], 4).unwrap();
    let start = date(2025, 2, 8);
    let original = generate_sessions(&spec, start, four_pm());
    let end = compute_end_date(&spec, start);

    assert_eq!(end, date(2025, 3, 1));
    assert_eq!(sessions_from_end_date(&spec, end, four_pm()), original);
}

#[test]
fn session_count_from_chosen_end_date() {
    let weekdays = [Monday, Wednesday];
    let start = date(2025, 1, 6);

    // Ending in the week of 01-20 means three weeks of two sessions.
    assert_eq!(total_sessions_until(&weekdays, start, date(2025, 1, 20)), Ok(6));
    // Any day inside that week ends in the same week.
    assert_eq!(total_sessions_until(&weekdays, start, date(2025, 1, 25)), Ok(6));
    // Ending on the start date is one week.
    assert_eq!(total_sessions_until(&[Monday], start, start), Ok(1));
}

#[test]
fn chosen_end_date_round_trips_through_count() {
    let start = date(2025, 1, 6);
    let chosen_end = date(2025, 2, 3);
    let total = total_sessions_until(&[Monday], start, chosen_end).unwrap();
    let spec = RecurrenceSpec::new(vec![Monday], total).unwrap();
    assert_eq!(compute_end_date(&spec, start), chosen_end);
}

#[test]
fn end_before_start_is_rejected() {
    let start = date(2025, 1, 6);
    let end = date(2025, 1, 5);
    assert_eq!(
        total_sessions_until(&[Monday], start, end),
        Err(ValidationError::EndBeforeStart { start, end })
    );
}
