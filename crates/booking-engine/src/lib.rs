//! # booking-engine
//!
//! Booking admission and recurrence expansion for shared venues.
//!
//! A venue's baseline availability is a weekly template plus date-specific
//! exceptions; admitted bookings occupy calendar time on top of it. The
//! engine decides whether a requested window may be admitted, deterministically
//! expands recurring requests into bounded series, and owns the booking and
//! payment state machines from admission onwards. Persistence is a seam —
//! callers inject a [`gateway::PersistenceGateway`] implementation.
//!
//! ## Modules
//!
//! - [`availability`] — calendar model + the calendar-rule check
//! - [`conflict`] — overlap detection against existing bookings
//! - [`expander`] — deterministic recurrence expansion
//! - [`lifecycle`] — booking/payment state machines
//! - [`admission`] — the serialized check-then-act pipeline
//! - [`gateway`] — persistence seam consumed by the pipeline
//! - [`memory`] — in-memory gateway for tests and demos
//! - [`booking`] — core data types
//! - [`error`] — error types

pub mod admission;
pub mod availability;
pub mod booking;
pub mod conflict;
pub mod error;
pub mod expander;
pub mod gateway;
pub mod lifecycle;
pub mod memory;

pub use admission::{BookingService, RecurringOutcome, SkippedDate};
pub use availability::{is_calendar_available, VenueCalendar};
pub use booking::{Booking, BookingRequest, BookingStatus, PaymentStatus, RecurrenceRule};
pub use conflict::has_conflict;
pub use error::{EngineError, Result, StorageError};
pub use expander::{expand, expand_dates};
pub use gateway::PersistenceGateway;
pub use lifecycle::CancellationActor;
pub use memory::MemoryGateway;
