//! Venue calendar model and the calendar-rule availability check.
//!
//! A venue's baseline availability is a weekly template plus date-specific
//! exceptions. An exception always wins over the template for its date —
//! including the inferred-from-product rule that `is_available = true` with
//! no slots opens the whole day, even a day the template marks closed.

use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::booking::{parse_date, parse_time};
use crate::error::{EngineError, Result};

/// A bookable slot within a day. Times are zero-padded `"HH:MM"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    /// Premium/off-peak multiplier applied by the pricing collaborator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_multiplier: Option<f64>,
}

/// Availability of a single weekday in the weekly template.
///
/// When `slots` is present and non-empty, requests must be fully contained in
/// a single slot; otherwise `open_time`/`close_time` bound the window; with
/// neither configured, an open day has no time constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayAvailability {
    pub is_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<TimeSlot>>,
}

impl DayAvailability {
    /// An open day with no time constraint configured.
    pub fn open_all_day() -> Self {
        Self {
            is_open: true,
            ..Self::default()
        }
    }

    /// An open day bounded by opening hours.
    pub fn open_between(open_time: &str, close_time: &str) -> Self {
        Self {
            is_open: true,
            open_time: Some(open_time.to_string()),
            close_time: Some(close_time.to_string()),
            slots: None,
        }
    }
}

/// A date-specific override of the weekly template. At most one per date,
/// enforced by the [`VenueCalendar::exceptions`] map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityException {
    pub id: String,
    /// `"YYYY-MM-DD"`; must match its key in the exceptions map.
    pub date: String,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<TimeSlot>>,
}

/// One [`DayAvailability`] per weekday. Days omitted from a serialized
/// template default to closed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyTemplate {
    pub monday: DayAvailability,
    pub tuesday: DayAvailability,
    pub wednesday: DayAvailability,
    pub thursday: DayAvailability,
    pub friday: DayAvailability,
    pub saturday: DayAvailability,
    pub sunday: DayAvailability,
}

impl WeeklyTemplate {
    pub fn for_weekday(&self, weekday: Weekday) -> &DayAvailability {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }
}

/// Weekly template plus date exceptions: a venue's baseline availability,
/// independent of existing bookings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueCalendar {
    pub weekly: WeeklyTemplate,
    /// Keyed by `"YYYY-MM-DD"` date — the map enforces at most one exception
    /// per date.
    #[serde(default)]
    pub exceptions: BTreeMap<String, AvailabilityException>,
}

impl VenueCalendar {
    /// Check structural invariants: `open_time < close_time` where both are
    /// present, every slot's `start_time < end_time`, exception keys match
    /// their dates, all strings canonical.
    pub fn validate(&self) -> Result<()> {
        for day in [
            &self.weekly.monday,
            &self.weekly.tuesday,
            &self.weekly.wednesday,
            &self.weekly.thursday,
            &self.weekly.friday,
            &self.weekly.saturday,
            &self.weekly.sunday,
        ] {
            validate_day(day)?;
        }
        for (key, exception) in &self.exceptions {
            parse_date(&exception.date)?;
            if key != &exception.date {
                return Err(EngineError::Validation(format!(
                    "exception keyed {key} carries date {}",
                    exception.date
                )));
            }
            if let Some(slots) = &exception.slots {
                validate_slots(slots)?;
            }
        }
        Ok(())
    }
}

fn validate_day(day: &DayAvailability) -> Result<()> {
    if let (Some(open), Some(close)) = (&day.open_time, &day.close_time) {
        parse_time(open)?;
        parse_time(close)?;
        if open >= close {
            return Err(EngineError::Validation(format!(
                "open time {open} must precede close time {close}"
            )));
        }
    }
    if let Some(slots) = &day.slots {
        validate_slots(slots)?;
    }
    Ok(())
}

fn validate_slots(slots: &[TimeSlot]) -> Result<()> {
    for slot in slots {
        parse_time(&slot.start_time)?;
        parse_time(&slot.end_time)?;
        if slot.start_time >= slot.end_time {
            return Err(EngineError::Validation(format!(
                "slot {} start {} must precede end {}",
                slot.id, slot.start_time, slot.end_time
            )));
        }
    }
    Ok(())
}

/// Decide whether the calendar admits `[start_time, end_time)` on `date`,
/// before any existing booking is considered.
///
/// Precedence, in order:
/// 1. An exception for the date overrides the weekly template entirely:
///    unavailable → denied; slots → the window must be fully contained in a
///    single slot; neither → the whole day is open.
/// 2. Otherwise the template's day applies: closed → denied; non-empty slots
///    → containment; else opening hours bound the window when configured.
/// 3. An open day with no constraint admits everything.
///
/// The weekday is computed from the proleptic Gregorian date; no timezone
/// conversion is performed.
pub fn is_calendar_available(
    calendar: &VenueCalendar,
    date: &str,
    start_time: &str,
    end_time: &str,
) -> Result<bool> {
    if let Some(exception) = calendar.exceptions.get(date) {
        if !exception.is_available {
            return Ok(false);
        }
        return Ok(match &exception.slots {
            Some(slots) => slot_contains_window(slots, start_time, end_time),
            None => true,
        });
    }

    let day = calendar.weekly.for_weekday(parse_date(date)?.weekday());
    if !day.is_open {
        return Ok(false);
    }
    if let Some(slots) = &day.slots {
        if !slots.is_empty() {
            return Ok(slot_contains_window(slots, start_time, end_time));
        }
    }
    Ok(match (&day.open_time, &day.close_time) {
        (Some(open), Some(close)) => {
            open.as_str() <= start_time && end_time <= close.as_str()
        }
        _ => true,
    })
}

/// Full containment, not partial overlap: some slot must satisfy
/// `slot.start <= start && end <= slot.end`.
fn slot_contains_window(slots: &[TimeSlot], start_time: &str, end_time: &str) -> bool {
    slots
        .iter()
        .any(|slot| slot.start_time.as_str() <= start_time && end_time <= slot.end_time.as_str())
}
