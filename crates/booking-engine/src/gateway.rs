//! Persistence seam consumed by the admission pipeline.
//!
//! The engine never talks to a concrete store; it is handed an implementation
//! of this trait. [`crate::memory::MemoryGateway`] is the in-process
//! reference implementation used by the test suites and the CLI.

use async_trait::async_trait;

use crate::availability::VenueCalendar;
use crate::booking::Booking;
use crate::error::StorageError;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Fetch a venue's calendar. `StorageError::NotFound` for unknown venues.
    async fn get_venue_calendar(&self, venue_id: &str) -> StorageResult<VenueCalendar>;

    /// All bookings for a venue on a date, as a consistent snapshot of a
    /// known point in time. No status filtering — that is the conflict
    /// detector's job.
    async fn list_bookings(&self, venue_id: &str, date: &str) -> StorageResult<Vec<Booking>>;

    /// Conditional create: persist the booking only if no overlapping active
    /// booking exists for the same venue and date at commit time, returning
    /// `StorageError::WriteConflict` otherwise.
    async fn create_booking(&self, booking: &Booking) -> StorageResult<String>;

    async fn get_booking(&self, booking_id: &str) -> StorageResult<Booking>;

    /// Persist the mutable fields of an existing booking.
    async fn update_booking(&self, booking: &Booking) -> StorageResult<()>;
}
