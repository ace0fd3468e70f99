//! The admission pipeline: calendar check, conflict check, serialized create.
//!
//! Admission is a check-then-act sequence over shared state (the venue's
//! existing bookings), so two concurrent requests for overlapping windows on
//! the same venue and date must not both pass. Attempts are serialized two
//! ways: in-process through a per-`(venue_id, date)` async mutex, and at the
//! store through the gateway's conditional create, which is retried with a
//! fresh snapshot up to a bounded budget when another writer got there first.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::availability::is_calendar_available;
use crate::booking::{Booking, BookingRequest, BookingStatus, PaymentStatus, RecurringLink};
use crate::conflict::has_conflict;
use crate::error::{EngineError, Result, StorageError};
use crate::expander;
use crate::gateway::PersistenceGateway;
use crate::lifecycle::{self, CancellationActor};

/// Attempts per admission before surfacing `AdmissionFailed`.
const RETRY_BUDGET: u32 = 3;

/// Registry of per-`(venue_id, date)` locks. Entries are created on demand
/// and live for the registry's lifetime; the key space is bounded by the
/// venues and dates actually requested in-process.
#[derive(Default)]
struct KeyedLocks {
    locks: Mutex<HashMap<(String, String), Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    async fn get(&self, venue_id: &str, date: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry((venue_id.to_string(), date.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// One recurrence date that failed its own admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDate {
    pub date: String,
    pub reason: String,
}

/// Result of a recurring creation: the parent plus, per generated date,
/// either an admitted child booking or a skip reason. Children are
/// independent bookings, not a transaction — the parent stands even when
/// every child was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct RecurringOutcome {
    pub parent: Booking,
    pub admitted: Vec<Booking>,
    pub skipped: Vec<SkippedDate>,
}

/// Booking admission and lifecycle service. Holds only the injected gateway
/// and its in-process lock registry; there is no global state.
pub struct BookingService {
    gateway: Arc<dyn PersistenceGateway>,
    locks: KeyedLocks,
}

impl BookingService {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            gateway,
            locks: KeyedLocks::default(),
        }
    }

    /// Run the calendar and conflict checks without persisting anything.
    ///
    /// Distinguishes [`EngineError::AvailabilityDenied`] (the calendar rules
    /// forbid the window) from [`EngineError::ConflictDenied`] (an active
    /// booking occupies it).
    pub async fn check_admissible(
        &self,
        venue_id: &str,
        date: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<()> {
        let calendar = self
            .gateway
            .get_venue_calendar(venue_id)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => EngineError::VenueNotFound(venue_id.to_string()),
                other => storage(other),
            })?;
        if !is_calendar_available(&calendar, date, start_time, end_time)? {
            return Err(EngineError::AvailabilityDenied);
        }
        let existing = self
            .gateway
            .list_bookings(venue_id, date)
            .await
            .map_err(storage)?;
        if has_conflict(&existing, start_time, end_time) {
            return Err(EngineError::ConflictDenied);
        }
        Ok(())
    }

    /// Admit a single, non-recurring request and persist it as `Pending`.
    pub async fn create_booking(&self, request: &BookingRequest) -> Result<Booking> {
        request.validate()?;
        if request.is_recurring {
            return Err(EngineError::Validation(
                "recurring requests go through create_recurring".into(),
            ));
        }
        self.admit(request, None).await
    }

    /// Admit a recurring request: the parent first, then every generated
    /// child date through the same pipeline. Children for distinct dates run
    /// concurrently; per-date serialization still holds. Dates that fail
    /// their own admission are reported in `skipped`, never silently
    /// dropped, and never roll the parent back.
    pub async fn create_recurring(&self, request: &BookingRequest) -> Result<RecurringOutcome> {
        request.validate()?;
        let rule = request.recurrence_rule.as_ref().ok_or_else(|| {
            EngineError::Validation("recurring request is missing a recurrence rule".into())
        })?;
        if !request.is_recurring {
            return Err(EngineError::Validation(
                "request is not flagged recurring".into(),
            ));
        }

        // Expand before admitting anything so a bad rule fails the whole
        // request instead of leaving an orphaned parent.
        let child_requests = expander::expand(request, rule)?;
        let mut parent = self.admit(request, None).await?;
        let parent_id = parent.id.clone();

        let results = join_all(
            child_requests
                .iter()
                .map(|child| self.admit(child, Some(parent_id.clone()))),
        )
        .await;

        let mut admitted = Vec::new();
        let mut skipped = Vec::new();
        for (child, result) in child_requests.iter().zip(results) {
            match result {
                Ok(booking) => admitted.push(booking),
                Err(reason) => skipped.push(SkippedDate {
                    date: child.date.clone(),
                    reason: reason.to_string(),
                }),
            }
        }

        if let Some(link) = parent.recurring_link.as_mut() {
            link.child_booking_ids = admitted.iter().map(|b| b.id.clone()).collect();
        }
        parent.updated_at = Utc::now();
        self.gateway
            .update_booking(&parent)
            .await
            .map_err(storage)?;

        tracing::info!(
            parent_id = %parent.id,
            admitted = admitted.len(),
            skipped = skipped.len(),
            "recurring booking created"
        );
        Ok(RecurringOutcome {
            parent,
            admitted,
            skipped,
        })
    }

    /// The serialized check-then-act core shared by single and recurring
    /// admission. `parent_id` marks a recurrence child.
    async fn admit(&self, request: &BookingRequest, parent_id: Option<String>) -> Result<Booking> {
        let key_lock = self.locks.get(&request.venue_id, &request.date).await;
        let _guard = key_lock.lock().await;

        let mut attempts = 0;
        loop {
            attempts += 1;
            self.check_admissible(
                &request.venue_id,
                &request.date,
                &request.start_time,
                &request.end_time,
            )
            .await?;

            let mut booking = Booking::from_request(request)?;
            if let Some(parent) = &parent_id {
                booking.is_recurring = true;
                booking.recurring_link = Some(RecurringLink {
                    parent_booking_id: Some(parent.clone()),
                    child_booking_ids: Vec::new(),
                });
            } else if request.is_recurring {
                booking.recurring_link = Some(RecurringLink::default());
            }

            match self.gateway.create_booking(&booking).await {
                Ok(_) => {
                    tracing::info!(
                        booking_id = %booking.id,
                        venue_id = %booking.venue_id,
                        date = %booking.date,
                        window = %format!("{}-{}", booking.start_time, booking.end_time),
                        "booking admitted"
                    );
                    return Ok(booking);
                }
                // Lost the race to another writer; re-read and re-check so a
                // durable overlap is reported as ConflictDenied rather than
                // burning the whole budget.
                Err(StorageError::WriteConflict) if attempts < RETRY_BUDGET => {
                    tracing::warn!(
                        venue_id = %request.venue_id,
                        date = %request.date,
                        attempts,
                        "write conflict during admission, retrying"
                    );
                }
                Err(StorageError::WriteConflict) => {
                    return Err(EngineError::AdmissionFailed { attempts });
                }
                Err(other) => return Err(storage(other)),
            }
        }
    }

    // ── Lifecycle operations ────────────────────────────────────────────

    pub async fn get_booking(&self, booking_id: &str) -> Result<Booking> {
        self.load(booking_id).await
    }

    pub async fn confirm_booking(&self, booking_id: &str) -> Result<Booking> {
        let mut booking = self.load(booking_id).await?;
        lifecycle::confirm(&mut booking)?;
        self.store(&booking).await?;
        Ok(booking)
    }

    pub async fn reject_booking(&self, booking_id: &str) -> Result<Booking> {
        let mut booking = self.load(booking_id).await?;
        lifecycle::reject(&mut booking)?;
        self.store(&booking).await?;
        Ok(booking)
    }

    pub async fn cancel_booking(
        &self,
        booking_id: &str,
        reason: &str,
        actor: CancellationActor,
    ) -> Result<Booking> {
        let mut booking = self.load(booking_id).await?;
        lifecycle::cancel(&mut booking, reason, actor)?;
        self.store(&booking).await?;
        Ok(booking)
    }

    pub async fn check_in(&self, booking_id: &str) -> Result<Booking> {
        let mut booking = self.load(booking_id).await?;
        lifecycle::check_in(&mut booking)?;
        self.store(&booking).await?;
        Ok(booking)
    }

    pub async fn check_out(&self, booking_id: &str) -> Result<Booking> {
        let mut booking = self.load(booking_id).await?;
        lifecycle::check_out(&mut booking)?;
        self.store(&booking).await?;
        Ok(booking)
    }

    pub async fn record_refund(
        &self,
        booking_id: &str,
        amount: i64,
        reason: &str,
    ) -> Result<Booking> {
        let mut booking = self.load(booking_id).await?;
        lifecycle::record_refund(&mut booking, amount, reason)?;
        self.store(&booking).await?;
        Ok(booking)
    }

    /// Payment collaborator surface. The engine consumes only the resulting
    /// status — gateway-specific fields stay in `metadata` and are logged,
    /// never stored. A successful payment confirms a pending booking; a
    /// failed payment fails it.
    pub async fn on_payment_result(
        &self,
        booking_id: &str,
        status: PaymentStatus,
        metadata: serde_json::Value,
    ) -> Result<Booking> {
        let mut booking = self.load(booking_id).await?;
        lifecycle::set_payment_status(&mut booking, status)?;
        tracing::debug!(booking_id = %booking.id, %metadata, "payment result received");

        match status {
            PaymentStatus::Paid if booking.status == BookingStatus::Pending => {
                lifecycle::confirm(&mut booking)?;
            }
            PaymentStatus::Failed if booking.status == BookingStatus::Pending => {
                lifecycle::transition(&mut booking, BookingStatus::Failed)?;
            }
            _ => {}
        }

        self.store(&booking).await?;
        Ok(booking)
    }

    async fn load(&self, booking_id: &str) -> Result<Booking> {
        self.gateway
            .get_booking(booking_id)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => EngineError::BookingNotFound(booking_id.to_string()),
                other => storage(other),
            })
    }

    async fn store(&self, booking: &Booking) -> Result<()> {
        self.gateway.update_booking(booking).await.map_err(storage)
    }
}

fn storage(error: StorageError) -> EngineError {
    EngineError::Storage(error.to_string())
}
