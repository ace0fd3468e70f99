//! Error types for booking-engine operations.

use thiserror::Error;

use crate::booking::{BookingStatus, PaymentStatus};

/// Errors surfaced by the admission pipeline and the lifecycle state machines.
///
/// `AvailabilityDenied` and `ConflictDenied` are expected, user-facing
/// outcomes, kept distinct so callers can produce precise messaging.
/// `Storage` is always retryable by the caller; `AdmissionFailed` is not —
/// the internal retry budget has already been spent.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("venue not found: {0}")]
    VenueNotFound(String),

    #[error("booking not found: {0}")]
    BookingNotFound(String),

    #[error("the venue calendar does not allow this window")]
    AvailabilityDenied,

    #[error("the window overlaps an existing booking")]
    ConflictDenied,

    #[error("admission failed after {attempts} attempts")]
    AdmissionFailed { attempts: u32 },

    #[error("invalid status transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("invalid payment transition from {from:?} to {to:?}")]
    InvalidPaymentTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors returned by a [`crate::gateway::PersistenceGateway`] implementation.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    /// The conditional create lost the race: an overlapping active booking
    /// existed at commit time.
    #[error("write conflict")]
    WriteConflict,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
