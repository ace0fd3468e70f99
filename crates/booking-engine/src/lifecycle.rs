//! Booking and payment state machines.
//!
//! Status graph: `Pending → Confirmed → CheckedIn → Completed` on the happy
//! path; `Pending → Rejected | Failed`; any non-terminal status can be
//! cancelled by user, venue, or admin. Terminal statuses are sinks — the only
//! thing that may still change on a terminal booking is payment state
//! (refund bookkeeping).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::{Booking, BookingStatus, PaymentStatus, Refund};
use crate::error::{EngineError, Result};

/// Who initiated a cancellation. Determines the resulting status variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationActor {
    User,
    Venue,
    Admin,
}

impl CancellationActor {
    pub fn status(self) -> BookingStatus {
        match self {
            CancellationActor::User => BookingStatus::CancelledByUser,
            CancellationActor::Venue => BookingStatus::CancelledByVenue,
            CancellationActor::Admin => BookingStatus::CancelledByAdmin,
        }
    }
}

/// Validate a status transition without applying it.
pub fn validate_transition(from: BookingStatus, to: BookingStatus) -> Result<()> {
    use BookingStatus::*;

    match (from, to) {
        (Pending, Confirmed) | (Pending, Rejected) | (Pending, Failed) => Ok(()),
        (Confirmed, CheckedIn) => Ok(()),
        // Check-out closes the booking whether or not the venue ever scanned
        // the check-in.
        (Confirmed, Completed) | (CheckedIn, Completed) => Ok(()),
        (from, to) if to.is_cancelled() && !from.is_terminal() => Ok(()),
        _ => Err(EngineError::InvalidTransition { from, to }),
    }
}

/// Apply a validated status transition and bump `updated_at`.
pub fn transition(booking: &mut Booking, to: BookingStatus) -> Result<()> {
    validate_transition(booking.status, to)?;
    tracing::info!(
        booking_id = %booking.id,
        from = ?booking.status,
        to = ?to,
        "booking status transition"
    );
    booking.status = to;
    booking.updated_at = Utc::now();
    Ok(())
}

pub fn confirm(booking: &mut Booking) -> Result<()> {
    transition(booking, BookingStatus::Confirmed)
}

pub fn reject(booking: &mut Booking) -> Result<()> {
    transition(booking, BookingStatus::Rejected)
}

/// Record check-in. Only valid once the booking is confirmed.
pub fn check_in(booking: &mut Booking) -> Result<()> {
    transition(booking, BookingStatus::CheckedIn)?;
    booking.check_in_time = Some(Utc::now());
    Ok(())
}

/// Record check-out, transitioning directly to `Completed`.
pub fn check_out(booking: &mut Booking) -> Result<()> {
    transition(booking, BookingStatus::Completed)?;
    booking.check_out_time = Some(Utc::now());
    Ok(())
}

/// Cancel a non-terminal booking. Requires a non-empty reason; the actor
/// selects the resulting status variant. The cancellation timestamp feeds the
/// downstream refund-eligibility policy.
pub fn cancel(booking: &mut Booking, reason: &str, actor: CancellationActor) -> Result<()> {
    if reason.trim().is_empty() {
        return Err(EngineError::Validation(
            "cancellation requires a reason".into(),
        ));
    }
    transition(booking, actor.status())?;
    booking.cancellation_reason = Some(reason.to_string());
    booking.cancellation_time = Some(Utc::now());
    Ok(())
}

/// Validate a payment-status change. `Paid` is only reachable from
/// `Pending`/`Processing`; the refunded statuses are never set directly —
/// they fall out of [`record_refund`]'s threshold arithmetic.
pub fn validate_payment_transition(from: PaymentStatus, to: PaymentStatus) -> Result<()> {
    use PaymentStatus::*;

    match to {
        Paid if !matches!(from, Pending | Processing) => {
            Err(EngineError::InvalidPaymentTransition { from, to })
        }
        PartiallyRefunded | FullyRefunded => {
            Err(EngineError::InvalidPaymentTransition { from, to })
        }
        _ => Ok(()),
    }
}

/// Apply a payment-status change from the payment collaborator.
pub fn set_payment_status(booking: &mut Booking, to: PaymentStatus) -> Result<()> {
    validate_payment_transition(booking.payment_status, to)?;
    tracing::info!(
        booking_id = %booking.id,
        from = ?booking.payment_status,
        to = ?to,
        "payment status transition"
    );
    booking.payment_status = to;
    booking.updated_at = Utc::now();
    Ok(())
}

/// Record a refund and derive the payment status from cumulative amounts:
/// `FullyRefunded` once refunds reach `price.total_amount`, otherwise
/// `PartiallyRefunded`. Refunds require a paid booking and remain allowed on
/// terminal statuses.
pub fn record_refund(booking: &mut Booking, amount: i64, reason: &str) -> Result<()> {
    if amount <= 0 {
        return Err(EngineError::Validation(
            "refund amount must be positive".into(),
        ));
    }
    if !matches!(
        booking.payment_status,
        PaymentStatus::Paid | PaymentStatus::PartiallyRefunded
    ) {
        return Err(EngineError::InvalidPaymentTransition {
            from: booking.payment_status,
            to: PaymentStatus::PartiallyRefunded,
        });
    }

    booking.refunds.push(Refund {
        id: Uuid::new_v4().to_string(),
        amount,
        reason: reason.to_string(),
        recorded_at: Utc::now(),
    });

    let cumulative = booking.refunded_amount();
    booking.payment_status = if cumulative >= booking.price.total_amount {
        PaymentStatus::FullyRefunded
    } else {
        PaymentStatus::PartiallyRefunded
    };
    booking.updated_at = Utc::now();
    tracing::info!(
        booking_id = %booking.id,
        refunded = cumulative,
        total = booking.price.total_amount,
        status = ?booking.payment_status,
        "refund recorded"
    );
    Ok(())
}
