//! Tests for request validation and booking construction.
//!
//! The zero-padding invariant on `"HH:MM"`/`"YYYY-MM-DD"` strings is what
//! makes lexical comparison valid, so non-canonical forms must be rejected
//! even when they would parse.

use booking_engine::booking::{
    duration_minutes, generate_booking_code, parse_date, parse_time, Booking, BookingRequest,
    BookingStatus, BookingType, Frequency, PaymentStatus, RecurrenceRule,
};

fn valid_request() -> BookingRequest {
    BookingRequest {
        venue_id: "court-1".to_string(),
        user_id: "user-1".to_string(),
        date: "2024-03-01".to_string(),
        start_time: "09:00".to_string(),
        end_time: "10:30".to_string(),
        total_players: 10,
        booking_type: BookingType::FullVenue,
        court_number: None,
        notes: None,
        is_recurring: false,
        recurrence_rule: None,
    }
}

#[test]
fn valid_request_passes() {
    assert!(valid_request().validate().is_ok());
}

#[test]
fn inverted_or_empty_window_is_rejected() {
    let mut request = valid_request();
    request.start_time = "10:30".to_string();
    request.end_time = "09:00".to_string();
    assert!(request.validate().is_err());

    let mut request = valid_request();
    request.end_time = request.start_time.clone();
    assert!(request.validate().is_err());
}

#[test]
fn non_canonical_date_and_time_are_rejected() {
    // These would parse, but break lexical ordering.
    assert!(parse_date("2024-1-1").is_err());
    assert!(parse_time("9:00").is_err());
    // Plainly invalid values.
    assert!(parse_date("2024-02-30").is_err());
    assert!(parse_time("24:00").is_err());
    assert!(parse_time("09:60").is_err());
    // Canonical values pass.
    assert!(parse_date("2024-02-29").is_ok());
    assert!(parse_time("00:00").is_ok());
    assert!(parse_time("23:59").is_ok());
}

#[test]
fn recurring_request_requires_a_rule() {
    let mut request = valid_request();
    request.is_recurring = true;
    assert!(request.validate().is_err());
}

#[test]
fn recurrence_end_date_must_not_precede_booking_date() {
    let mut request = valid_request();
    request.is_recurring = true;
    request.recurrence_rule = Some(RecurrenceRule {
        frequency: Frequency::Weekly,
        interval: 1,
        end_date: "2024-02-01".to_string(),
        exclude_dates: Vec::new(),
    });
    assert!(request.validate().is_err());
}

#[test]
fn booking_from_request_starts_pending() {
    let booking = Booking::from_request(&valid_request()).unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.payment_status, PaymentStatus::Pending);
    assert_eq!(booking.duration_minutes, 90);
    assert_eq!(booking.date, "2024-03-01");
    assert!(booking.recurring_link.is_none());
    assert!(booking.refunds.is_empty());
    assert!(!booking.id.is_empty());
}

#[test]
fn booking_ids_and_codes_are_distinct() {
    let a = Booking::from_request(&valid_request()).unwrap();
    let b = Booking::from_request(&valid_request()).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn booking_codes_are_six_uppercase_alphanumerics() {
    for _ in 0..50 {
        let code = generate_booking_code();
        assert_eq!(code.len(), 6);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}

#[test]
fn duration_is_minutes_between_times() {
    assert_eq!(duration_minutes("09:00", "10:30").unwrap(), 90);
    assert_eq!(duration_minutes("00:00", "23:59").unwrap(), 1439);
    assert!(duration_minutes("10:00", "09:00").is_err());
}
