//! Tests for recurrence expansion.
//!
//! Expansion is pure and deterministic; the base date is never part of the
//! output.

use booking_engine::booking::{BookingRequest, BookingType, Frequency, RecurrenceRule};
use booking_engine::expander::{expand, expand_dates, MAX_OCCURRENCES};

fn rule(frequency: Frequency, interval: u32, end_date: &str) -> RecurrenceRule {
    RecurrenceRule {
        frequency,
        interval,
        end_date: end_date.to_string(),
        exclude_dates: Vec::new(),
    }
}

fn base_request(date: &str, r: RecurrenceRule) -> BookingRequest {
    BookingRequest {
        venue_id: "court-1".to_string(),
        user_id: "user-1".to_string(),
        date: date.to_string(),
        start_time: "18:00".to_string(),
        end_time: "19:00".to_string(),
        total_players: 10,
        booking_type: BookingType::FullVenue,
        court_number: None,
        notes: None,
        is_recurring: true,
        recurrence_rule: Some(r),
    }
}

#[test]
fn weekly_expansion_excludes_base_and_includes_end_date() {
    let r = rule(Frequency::Weekly, 1, "2024-01-22");
    let dates = expand_dates("2024-01-01", &r).unwrap();
    assert_eq!(dates, vec!["2024-01-08", "2024-01-15", "2024-01-22"]);
}

#[test]
fn exclude_dates_are_skipped() {
    let mut r = rule(Frequency::Weekly, 1, "2024-01-22");
    r.exclude_dates = vec!["2024-01-15".to_string()];
    let dates = expand_dates("2024-01-01", &r).unwrap();
    assert_eq!(dates, vec!["2024-01-08", "2024-01-22"]);
}

#[test]
fn daily_expansion_respects_interval() {
    let r = rule(Frequency::Daily, 3, "2024-01-10");
    let dates = expand_dates("2024-01-01", &r).unwrap();
    assert_eq!(dates, vec!["2024-01-04", "2024-01-07", "2024-01-10"]);
}

#[test]
fn weekly_expansion_respects_interval() {
    let r = rule(Frequency::Weekly, 2, "2024-02-01");
    let dates = expand_dates("2024-01-01", &r).unwrap();
    assert_eq!(dates, vec!["2024-01-15", "2024-01-29"]);
}

#[test]
fn monthly_expansion_preserves_day_of_month() {
    let r = rule(Frequency::Monthly, 1, "2024-04-15");
    let dates = expand_dates("2024-01-15", &r).unwrap();
    assert_eq!(dates, vec!["2024-02-15", "2024-03-15", "2024-04-15"]);
}

#[test]
fn monthly_expansion_clamps_short_months_and_recovers() {
    // The 31st anchors the series: February clamps to its last day (leap
    // year here), and March returns to the 31st.
    let r = rule(Frequency::Monthly, 1, "2024-04-30");
    let dates = expand_dates("2024-01-31", &r).unwrap();
    assert_eq!(dates, vec!["2024-02-29", "2024-03-31", "2024-04-30"]);
}

#[test]
fn end_date_equal_to_base_yields_empty_series() {
    let r = rule(Frequency::Daily, 1, "2024-01-01");
    let dates = expand_dates("2024-01-01", &r).unwrap();
    assert!(dates.is_empty());
}

#[test]
fn end_date_before_base_is_rejected() {
    let r = rule(Frequency::Daily, 1, "2023-12-31");
    assert!(expand_dates("2024-01-01", &r).is_err());
}

#[test]
fn zero_interval_is_rejected() {
    let r = rule(Frequency::Daily, 0, "2024-01-10");
    assert!(expand_dates("2024-01-01", &r).is_err());
}

#[test]
fn expansion_is_deterministic() {
    let mut r = rule(Frequency::Weekly, 1, "2024-06-30");
    r.exclude_dates = vec!["2024-03-04".to_string(), "2024-05-06".to_string()];
    let first = expand_dates("2024-01-01", &r).unwrap();
    let second = expand_dates("2024-01-01", &r).unwrap();
    assert_eq!(first, second);
}

#[test]
fn oversized_series_is_rejected_not_truncated() {
    // Daily over ~two years blows past the occurrence cap.
    let r = rule(Frequency::Daily, 1, "2026-01-01");
    let result = expand_dates("2024-01-01", &r);
    assert!(result.is_err(), "series past {MAX_OCCURRENCES} must error");
}

#[test]
fn children_copy_the_base_except_date_and_recurrence() {
    let r = rule(Frequency::Weekly, 1, "2024-01-22");
    let base = base_request("2024-01-01", r.clone());
    let children = expand(&base, &r).unwrap();

    assert_eq!(children.len(), 3);
    for child in &children {
        assert_eq!(child.venue_id, base.venue_id);
        assert_eq!(child.user_id, base.user_id);
        assert_eq!(child.start_time, base.start_time);
        assert_eq!(child.end_time, base.end_time);
        assert_eq!(child.total_players, base.total_players);
        assert_ne!(child.date, base.date, "base date must not be emitted");
        assert!(!child.is_recurring, "children are single-date requests");
        assert!(child.recurrence_rule.is_none());
    }
    assert_eq!(children[0].date, "2024-01-08");
    assert_eq!(children[2].date, "2024-01-22");
}

#[test]
fn malformed_exclude_date_is_rejected() {
    let mut r = rule(Frequency::Weekly, 1, "2024-01-22");
    r.exclude_dates = vec!["01/15/2024".to_string()];
    assert!(expand_dates("2024-01-01", &r).is_err());
}
