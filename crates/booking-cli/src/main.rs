//! `booking` CLI — check availability, expand recurrence rules, and admit
//! booking requests against a JSON fixture.
//!
//! ## Usage
//!
//! ```sh
//! # Is the window bookable for this venue and date?
//! booking check --fixture court.json --venue court-1 \
//!     --date 2024-03-01 --start 09:00 --end 10:00
//!
//! # Expand a recurrence rule into concrete dates
//! booking expand --date 2024-01-01 --frequency weekly \
//!     --interval 1 --until 2024-01-22 --exclude 2024-01-15
//!
//! # Admit a booking request (stdin or -i) and print the result as JSON
//! cat request.json | booking book --fixture court.json
//! ```
//!
//! The fixture holds venue calendars plus booking requests to seed the
//! in-memory store with; it stands in for the real persistence layer.

use std::collections::HashMap;
use std::io::{self, Read};
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use booking_engine::booking::{BookingRequest, Frequency, RecurrenceRule};
use booking_engine::{BookingService, EngineError, MemoryGateway, VenueCalendar};

#[derive(Parser)]
#[command(name = "booking", version, about = "Venue booking admission engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a window is admissible for a venue on a date
    Check {
        /// Fixture file with venue calendars and seeded bookings
        #[arg(short, long)]
        fixture: String,
        /// Venue id within the fixture
        #[arg(short, long)]
        venue: String,
        /// Date, "YYYY-MM-DD"
        #[arg(short, long)]
        date: String,
        /// Window start, 24h "HH:MM"
        #[arg(short, long)]
        start: String,
        /// Window end, 24h "HH:MM"
        #[arg(short, long)]
        end: String,
    },
    /// Expand a recurrence rule into the dates it generates
    Expand {
        /// Base date, "YYYY-MM-DD" (not part of the output)
        #[arg(short, long)]
        date: String,
        /// daily, weekly, or monthly
        #[arg(short, long)]
        frequency: String,
        /// Every N days/weeks/months
        #[arg(short, long, default_value_t = 1)]
        interval: u32,
        /// Inclusive end date, "YYYY-MM-DD"
        #[arg(short, long)]
        until: String,
        /// Dates to skip (repeatable)
        #[arg(short = 'x', long)]
        exclude: Vec<String>,
    },
    /// Admit a booking request against the fixture and print the outcome
    Book {
        /// Fixture file with venue calendars and seeded bookings
        #[arg(short, long)]
        fixture: String,
        /// Request JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

/// Venue calendars plus booking requests to pre-admit into the store.
#[derive(Deserialize)]
struct Fixture {
    #[serde(default)]
    venues: HashMap<String, VenueCalendar>,
    #[serde(default)]
    bookings: Vec<BookingRequest>,
}

async fn load_fixture(path: &str) -> Result<BookingService> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fixture {path}"))?;
    let fixture: Fixture =
        serde_json::from_str(&text).with_context(|| format!("failed to parse fixture {path}"))?;

    let gateway = Arc::new(MemoryGateway::new());
    for (venue_id, calendar) in fixture.venues {
        calendar
            .validate()
            .with_context(|| format!("invalid calendar for venue {venue_id}"))?;
        gateway.insert_venue(&venue_id, calendar).await;
    }

    let service = BookingService::new(gateway);
    for seed in &fixture.bookings {
        service
            .create_booking(seed)
            .await
            .map_err(|e| anyhow::anyhow!("seeded booking on {} was not admitted: {e}", seed.date))?;
    }
    Ok(service)
}

fn read_input(input: Option<&str>) -> Result<String> {
    match input {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn parse_frequency(s: &str) -> Result<Frequency> {
    match s.to_lowercase().as_str() {
        "daily" => Ok(Frequency::Daily),
        "weekly" => Ok(Frequency::Weekly),
        "monthly" => Ok(Frequency::Monthly),
        other => bail!("unknown frequency {other:?} (expected daily, weekly, or monthly)"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check {
            fixture,
            venue,
            date,
            start,
            end,
        } => {
            let service = load_fixture(&fixture).await?;
            match service.check_admissible(&venue, &date, &start, &end).await {
                Ok(()) => println!("available"),
                Err(e @ (EngineError::AvailabilityDenied | EngineError::ConflictDenied)) => {
                    println!("denied: {e}");
                    process::exit(1);
                }
                Err(other) => return Err(other.into()),
            }
        }
        Commands::Expand {
            date,
            frequency,
            interval,
            until,
            exclude,
        } => {
            let rule = RecurrenceRule {
                frequency: parse_frequency(&frequency)?,
                interval,
                end_date: until,
                exclude_dates: exclude,
            };
            for d in booking_engine::expand_dates(&date, &rule)? {
                println!("{d}");
            }
        }
        Commands::Book { fixture, input } => {
            let service = load_fixture(&fixture).await?;
            let text = read_input(input.as_deref())?;
            let request: BookingRequest =
                serde_json::from_str(&text).context("failed to parse booking request")?;

            if request.is_recurring {
                match service.create_recurring(&request).await {
                    Ok(outcome) => println!("{}", serde_json::to_string_pretty(&outcome)?),
                    Err(e @ (EngineError::AvailabilityDenied | EngineError::ConflictDenied)) => {
                        println!("denied: {e}");
                        process::exit(1);
                    }
                    Err(other) => return Err(other.into()),
                }
            } else {
                match service.create_booking(&request).await {
                    Ok(booking) => println!("{}", serde_json::to_string_pretty(&booking)?),
                    Err(e @ (EngineError::AvailabilityDenied | EngineError::ConflictDenied)) => {
                        println!("denied: {e}");
                        process::exit(1);
                    }
                    Err(other) => return Err(other.into()),
                }
            }
        }
    }
    Ok(())
}
