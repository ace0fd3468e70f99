//! Core booking data types.
//!
//! Dates are `"YYYY-MM-DD"` strings and times are 24h `"HH:MM"` strings, both
//! zero-padded. Ordering comparisons on them are lexical, which is valid
//! *only* because of the zero padding — [`parse_date`] and [`parse_time`]
//! reject anything that would break that invariant. No timezone conversion is
//! performed anywhere: dates are naive calendar dates, times are naive wall
//! clock.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, Result};

/// Lifecycle status of a booking.
///
/// Terminal statuses (`Completed`, the cancelled variants, `Rejected`,
/// `Failed`) accept no further status transitions; see [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Completed,
    CancelledByUser,
    CancelledByVenue,
    CancelledByAdmin,
    Rejected,
    Failed,
}

impl BookingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Completed
                | BookingStatus::CancelledByUser
                | BookingStatus::CancelledByVenue
                | BookingStatus::CancelledByAdmin
                | BookingStatus::Rejected
                | BookingStatus::Failed
        )
    }

    pub fn is_cancelled(self) -> bool {
        matches!(
            self,
            BookingStatus::CancelledByUser
                | BookingStatus::CancelledByVenue
                | BookingStatus::CancelledByAdmin
        )
    }

    /// Whether a booking in this status occupies calendar time. Cancelled,
    /// rejected, and failed bookings never block other admissions.
    pub fn occupies_calendar(self) -> bool {
        !self.is_cancelled() && !matches!(self, BookingStatus::Rejected | BookingStatus::Failed)
    }
}

/// Payment sub-state, evolving independently of [`BookingStatus`] but
/// constrained by [`crate::lifecycle::set_payment_status`] and
/// [`crate::lifecycle::record_refund`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Paid,
    PartiallyRefunded,
    FullyRefunded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    FullVenue,
    PartialVenue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

/// A recurrence specification: every `interval` days/weeks/months from the
/// base date, up to and including `end_date`, minus `exclude_dates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Every `interval` days/weeks/months. Must be at least 1.
    pub interval: u32,
    /// Inclusive end bound, `"YYYY-MM-DD"`.
    pub end_date: String,
    /// Dates to skip, exact string match.
    #[serde(default)]
    pub exclude_dates: Vec<String>,
}

/// Price breakdown in minor currency units (paise, cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub base_amount: i64,
    pub taxes: i64,
    pub fees: i64,
    pub discounts: i64,
    pub total_amount: i64,
    pub currency: String,
}

impl Price {
    /// A zeroed price awaiting pricing by the payment collaborator.
    pub fn unpriced(currency: &str) -> Self {
        Self {
            base_amount: 0,
            taxes: 0,
            fees: 0,
            discounts: 0,
            total_amount: 0,
            currency: currency.to_string(),
        }
    }
}

/// A recorded refund against a booking's payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    /// Minor currency units.
    pub amount: i64,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

/// Links a booking into a recurring series. The parent references its
/// children and each child references the parent; neither owns the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringLink {
    pub parent_booking_id: Option<String>,
    pub child_booking_ids: Vec<String>,
}

/// An incoming request to book a venue window, before admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub venue_id: String,
    pub user_id: String,
    /// `"YYYY-MM-DD"`.
    pub date: String,
    /// `"HH:MM"`, 24h.
    pub start_time: String,
    /// `"HH:MM"`, 24h. Windows are half-open: `[start_time, end_time)`.
    pub end_time: String,
    pub total_players: u32,
    pub booking_type: BookingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<RecurrenceRule>,
}

impl BookingRequest {
    /// Reject malformed requests before any store access.
    pub fn validate(&self) -> Result<()> {
        parse_date(&self.date)?;
        parse_time(&self.start_time)?;
        parse_time(&self.end_time)?;
        if self.start_time >= self.end_time {
            return Err(EngineError::Validation(format!(
                "start time {} must precede end time {}",
                self.start_time, self.end_time
            )));
        }
        if self.is_recurring {
            let rule = self.recurrence_rule.as_ref().ok_or_else(|| {
                EngineError::Validation("recurring request is missing a recurrence rule".into())
            })?;
            if rule.interval < 1 {
                return Err(EngineError::Validation(
                    "recurrence interval must be at least 1".into(),
                ));
            }
            parse_date(&rule.end_date)?;
            if rule.end_date.as_str() < self.date.as_str() {
                return Err(EngineError::Validation(format!(
                    "recurrence end date {} precedes booking date {}",
                    rule.end_date, self.date
                )));
            }
            for excluded in &rule.exclude_dates {
                parse_date(excluded)?;
            }
        }
        Ok(())
    }
}

/// An admitted booking. Identity fields (`id`, `venue_id`, `user_id`, `date`,
/// `start_time`, `end_time`, `booking_code`) are immutable once created;
/// status, payment state, and price evolve through [`crate::lifecycle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub venue_id: String,
    pub user_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: u32,
    pub total_players: u32,
    pub booking_type: BookingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub price: Price,
    /// 6-char uppercase alphanumeric code handed to the venue at check-in.
    pub booking_code: String,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_link: Option<RecurringLink>,
    #[serde(default)]
    pub refunds: Vec<Refund>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Build a fresh `Pending` booking from a validated request.
    pub fn from_request(request: &BookingRequest) -> Result<Self> {
        request.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            venue_id: request.venue_id.clone(),
            user_id: request.user_id.clone(),
            date: request.date.clone(),
            start_time: request.start_time.clone(),
            end_time: request.end_time.clone(),
            duration_minutes: duration_minutes(&request.start_time, &request.end_time)?,
            total_players: request.total_players,
            booking_type: request.booking_type,
            court_number: request.court_number.clone(),
            notes: request.notes.clone(),
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            price: Price::unpriced("INR"),
            booking_code: generate_booking_code(),
            is_recurring: request.is_recurring,
            recurring_link: None,
            refunds: Vec::new(),
            cancellation_reason: None,
            cancellation_time: None,
            check_in_time: None,
            check_out_time: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sum of all recorded refund amounts, in minor units.
    pub fn refunded_amount(&self) -> i64 {
        self.refunds.iter().map(|r| r.amount).sum()
    }
}

/// Generate a 6-char uppercase alphanumeric booking code.
pub fn generate_booking_code() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Parse a zero-padded `"YYYY-MM-DD"` date, rejecting non-canonical forms
/// that would break lexical ordering.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let canonical = s.len() == 10 && s.as_bytes()[4] == b'-' && s.as_bytes()[7] == b'-';
    if !canonical {
        return Err(EngineError::Validation(format!("invalid date: {s:?}")));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| EngineError::Validation(format!("invalid date: {s:?}")))
}

/// Parse a zero-padded 24h `"HH:MM"` time, rejecting non-canonical forms
/// that would break lexical ordering.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let canonical = s.len() == 5 && s.as_bytes()[2] == b':';
    if !canonical {
        return Err(EngineError::Validation(format!("invalid time: {s:?}")));
    }
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| EngineError::Validation(format!("invalid time: {s:?}")))
}

/// Minutes between two `"HH:MM"` times on the same day.
pub fn duration_minutes(start_time: &str, end_time: &str) -> Result<u32> {
    let start = parse_time(start_time)?;
    let end = parse_time(end_time)?;
    let minutes = (end - start).num_minutes();
    u32::try_from(minutes).map_err(|_| {
        EngineError::Validation(format!(
            "start time {start_time} must precede end time {end_time}"
        ))
    })
}
