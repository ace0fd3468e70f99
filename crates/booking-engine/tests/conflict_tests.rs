//! Tests for overlap detection against existing bookings.
//!
//! Windows are half-open: touching endpoints never conflict.

use booking_engine::booking::{Booking, BookingRequest, BookingStatus, BookingType};
use booking_engine::conflict::{find_conflict, has_conflict, windows_overlap};

fn request(start: &str, end: &str) -> BookingRequest {
    BookingRequest {
        venue_id: "court-1".to_string(),
        user_id: "user-1".to_string(),
        date: "2024-03-01".to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        total_players: 10,
        booking_type: BookingType::FullVenue,
        court_number: None,
        notes: None,
        is_recurring: false,
        recurrence_rule: None,
    }
}

fn booking(start: &str, end: &str, status: BookingStatus) -> Booking {
    let mut booking = Booking::from_request(&request(start, end)).unwrap();
    booking.status = status;
    booking
}

#[test]
fn overlapping_window_conflicts() {
    let existing = vec![booking("09:00", "10:00", BookingStatus::Confirmed)];
    assert!(has_conflict(&existing, "09:30", "10:30"));
}

#[test]
fn contained_window_conflicts() {
    let existing = vec![booking("09:00", "12:00", BookingStatus::Confirmed)];
    assert!(has_conflict(&existing, "10:00", "11:00"));
}

#[test]
fn containing_window_conflicts() {
    let existing = vec![booking("10:00", "11:00", BookingStatus::Confirmed)];
    assert!(has_conflict(&existing, "09:00", "12:00"));
}

#[test]
fn touching_windows_do_not_conflict() {
    // A booking ending at 11:00 and a request starting at 11:00 never clash.
    let existing = vec![booking("10:00", "11:00", BookingStatus::Confirmed)];
    assert!(!has_conflict(&existing, "11:00", "12:00"));
    assert!(!has_conflict(&existing, "09:00", "10:00"));
}

#[test]
fn disjoint_windows_do_not_conflict() {
    let existing = vec![booking("09:00", "10:00", BookingStatus::Confirmed)];
    assert!(!has_conflict(&existing, "14:00", "15:00"));
}

#[test]
fn cancelled_and_dead_bookings_never_occupy_the_calendar() {
    for status in [
        BookingStatus::CancelledByUser,
        BookingStatus::CancelledByVenue,
        BookingStatus::CancelledByAdmin,
        BookingStatus::Rejected,
        BookingStatus::Failed,
    ] {
        let existing = vec![booking("09:00", "10:00", status)];
        assert!(
            !has_conflict(&existing, "09:00", "10:00"),
            "{status:?} should not occupy the calendar"
        );
    }
}

#[test]
fn pending_and_later_statuses_occupy_the_calendar() {
    for status in [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
        BookingStatus::Completed,
    ] {
        let existing = vec![booking("09:00", "10:00", status)];
        assert!(
            has_conflict(&existing, "09:30", "10:30"),
            "{status:?} should occupy the calendar"
        );
    }
}

#[test]
fn first_conflicting_booking_is_reported() {
    let existing = vec![
        booking("08:00", "09:00", BookingStatus::Confirmed),
        booking("09:00", "10:00", BookingStatus::Confirmed),
    ];
    let hit = find_conflict(&existing, "09:30", "10:30").expect("should conflict");
    assert_eq!(hit.start_time, "09:00");
}

#[test]
fn overlap_is_symmetric() {
    let windows = [
        ("09:00", "10:00"),
        ("09:30", "10:30"),
        ("10:00", "11:00"),
        ("08:00", "12:00"),
    ];
    for (s1, e1) in windows {
        for (s2, e2) in windows {
            assert_eq!(
                windows_overlap(s1, e1, s2, e2),
                windows_overlap(s2, e2, s1, e1),
                "overlap({s1}-{e1}, {s2}-{e2}) must be symmetric"
            );
            let a = vec![booking(s1, e1, BookingStatus::Confirmed)];
            let b = vec![booking(s2, e2, BookingStatus::Confirmed)];
            assert_eq!(
                has_conflict(&a, s2, e2),
                has_conflict(&b, s1, e1),
                "has_conflict must be symmetric for {s1}-{e1} vs {s2}-{e2}"
            );
        }
    }
}

#[test]
fn empty_booking_list_never_conflicts() {
    assert!(!has_conflict(&[], "09:00", "10:00"));
}
