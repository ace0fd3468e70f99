//! Recurrence expansion — one base request into an ordered series of child
//! requests.
//!
//! Pure and deterministic: no I/O, no randomness, no wall-clock dependence.
//! Calling [`expand`] twice with identical inputs yields identical,
//! identically-ordered output. The base request's own date is never part of
//! the output; it is admitted separately as the parent booking.

use chrono::{Days, Months, NaiveDate};

use crate::booking::{parse_date, BookingRequest, Frequency, RecurrenceRule};
use crate::error::{EngineError, Result};

/// Hard ceiling on generated occurrences. An end date bounds every series,
/// but a daily rule spanning years would still explode; rules that would
/// exceed the cap are rejected outright, never silently truncated.
pub const MAX_OCCURRENCES: usize = 500;

/// Expand a recurrence rule into the ordered candidate dates after
/// `start_date`, up to and including `rule.end_date`, skipping
/// `rule.exclude_dates`.
pub fn expand_dates(start_date: &str, rule: &RecurrenceRule) -> Result<Vec<String>> {
    if rule.interval < 1 {
        return Err(EngineError::Validation(
            "recurrence interval must be at least 1".into(),
        ));
    }
    let start = parse_date(start_date)?;
    let end = parse_date(&rule.end_date)?;
    if end < start {
        return Err(EngineError::Validation(format!(
            "recurrence end date {} precedes start date {start_date}",
            rule.end_date
        )));
    }
    for excluded in &rule.exclude_dates {
        parse_date(excluded)?;
    }

    let mut dates = Vec::new();
    for step in 1u32.. {
        if step as usize > MAX_OCCURRENCES {
            return Err(EngineError::Validation(format!(
                "recurrence rule expands past {MAX_OCCURRENCES} occurrences"
            )));
        }
        let candidate = occurrence(start, rule.frequency, rule.interval, step)?;
        if candidate > end {
            break;
        }
        let date = candidate.format("%Y-%m-%d").to_string();
        if !rule.exclude_dates.contains(&date) {
            dates.push(date);
        }
    }
    Ok(dates)
}

/// Expand a base request into child requests, one per surviving candidate
/// date. Children are identical to the base except for the date; they are
/// plain single-date requests, each independently admitted by the caller.
pub fn expand(base: &BookingRequest, rule: &RecurrenceRule) -> Result<Vec<BookingRequest>> {
    let children = expand_dates(&base.date, rule)?
        .into_iter()
        .map(|date| {
            let mut child = base.clone();
            child.date = date;
            child.is_recurring = false;
            child.recurrence_rule = None;
            child
        })
        .collect();
    Ok(children)
}

/// The `step`-th occurrence after `start`. Monthly stepping is computed from
/// the base date each time so the anchor day-of-month is preserved where the
/// target month allows it, and clamped to the month's last day otherwise
/// (Jan 31 → Feb 29 in a leap year, then Mar 31 again).
fn occurrence(start: NaiveDate, frequency: Frequency, interval: u32, step: u32) -> Result<NaiveDate> {
    let overflow = || {
        EngineError::Validation(format!(
            "recurrence step {step} from {start} overflows the calendar"
        ))
    };
    match frequency {
        Frequency::Daily => start
            .checked_add_days(Days::new(u64::from(step) * u64::from(interval)))
            .ok_or_else(overflow),
        Frequency::Weekly => start
            .checked_add_days(Days::new(7 * u64::from(step) * u64::from(interval)))
            .ok_or_else(overflow),
        Frequency::Monthly => {
            let months = step.checked_mul(interval).ok_or_else(overflow)?;
            start
                .checked_add_months(Months::new(months))
                .ok_or_else(overflow)
        }
    }
}
