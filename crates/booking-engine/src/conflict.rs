//! Overlap detection against existing bookings.
//!
//! Windows are half-open `[start, end)`: a booking ending at 10:00 and a
//! request starting at 10:00 do not conflict. Cancelled, rejected, and failed
//! bookings never occupy the calendar.

use crate::booking::Booking;

/// Two windows overlap iff `s1 < e2 && s2 < e1`. Times are zero-padded
/// `"HH:MM"` strings compared lexically.
pub fn windows_overlap(s1: &str, e1: &str, s2: &str, e2: &str) -> bool {
    s1 < e2 && s2 < e1
}

/// Find the first active booking whose window overlaps `[start_time,
/// end_time)`. `existing` must already be filtered to the venue and date
/// under consideration; status filtering happens here.
pub fn find_conflict<'a>(
    existing: &'a [Booking],
    start_time: &str,
    end_time: &str,
) -> Option<&'a Booking> {
    existing.iter().find(|booking| {
        booking.status.occupies_calendar()
            && windows_overlap(&booking.start_time, &booking.end_time, start_time, end_time)
    })
}

/// True if any active booking overlaps the requested window. The caller
/// rejects the whole request on true.
pub fn has_conflict(existing: &[Booking], start_time: &str, end_time: &str) -> bool {
    find_conflict(existing, start_time, end_time).is_some()
}
