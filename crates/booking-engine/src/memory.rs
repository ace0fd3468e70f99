//! In-memory [`PersistenceGateway`] for tests and demos.
//!
//! A single `RwLock` over the whole store makes every read a consistent
//! snapshot and the conditional create atomic, which is exactly the contract
//! the admission pipeline needs from a real store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::availability::VenueCalendar;
use crate::booking::Booking;
use crate::conflict::windows_overlap;
use crate::error::StorageError;
use crate::gateway::{PersistenceGateway, StorageResult};

#[derive(Default)]
struct Store {
    venues: HashMap<String, VenueCalendar>,
    bookings: HashMap<String, Booking>,
}

#[derive(Default)]
pub struct MemoryGateway {
    store: RwLock<Store>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_venue(&self, venue_id: &str, calendar: VenueCalendar) {
        let mut store = self.store.write().await;
        store.venues.insert(venue_id.to_string(), calendar);
    }

    pub async fn booking_count(&self) -> usize {
        self.store.read().await.bookings.len()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn get_venue_calendar(&self, venue_id: &str) -> StorageResult<VenueCalendar> {
        let store = self.store.read().await;
        store
            .venues
            .get(venue_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_bookings(&self, venue_id: &str, date: &str) -> StorageResult<Vec<Booking>> {
        let store = self.store.read().await;
        let mut bookings: Vec<Booking> = store
            .bookings
            .values()
            .filter(|b| b.venue_id == venue_id && b.date == date)
            .cloned()
            .collect();
        // Stable snapshot order for callers and tests.
        bookings.sort_by(|a, b| (&a.start_time, &a.id).cmp(&(&b.start_time, &b.id)));
        Ok(bookings)
    }

    async fn create_booking(&self, booking: &Booking) -> StorageResult<String> {
        let mut store = self.store.write().await;
        let clashes = store.bookings.values().any(|existing| {
            existing.venue_id == booking.venue_id
                && existing.date == booking.date
                && existing.status.occupies_calendar()
                && windows_overlap(
                    &existing.start_time,
                    &existing.end_time,
                    &booking.start_time,
                    &booking.end_time,
                )
        });
        if clashes {
            return Err(StorageError::WriteConflict);
        }
        store.bookings.insert(booking.id.clone(), booking.clone());
        Ok(booking.id.clone())
    }

    async fn get_booking(&self, booking_id: &str) -> StorageResult<Booking> {
        let store = self.store.read().await;
        store
            .bookings
            .get(booking_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn update_booking(&self, booking: &Booking) -> StorageResult<()> {
        let mut store = self.store.write().await;
        if !store.bookings.contains_key(&booking.id) {
            return Err(StorageError::NotFound);
        }
        store.bookings.insert(booking.id.clone(), booking.clone());
        Ok(())
    }
}
