use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use appointment_cell::models::{Booking, BookingCandidate, BookingSnapshot, SlotSearchRequest};
use appointment_cell::services::{
    AppointmentStats, BookingService, BulkConflictValidator, ProposalParser, SlotSearchService,
};
use clinic_cell::Catalog;
use shared_config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "scheduler-cli", about = "MedDent slot search and booking validation", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Find bookable slots for a procedure
    Slots {
        #[arg(long)]
        procedure: String,

        /// Only search this clinic
        #[arg(long)]
        clinic: Option<String>,

        /// Days to scan, starting today (default from SLOT_SEARCH_DAYS_AHEAD)
        #[arg(long)]
        days: Option<u32>,

        /// Maximum slots to return (default from SLOT_SEARCH_MAX_RESULTS)
        #[arg(long)]
        max: Option<usize>,

        /// JSON array of existing bookings
        #[arg(long)]
        bookings: Option<PathBuf>,

        /// First day of the search, YYYY-MM-DD
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Check a batch of candidate bookings for conflicts and duplicates
    Validate {
        /// JSON array of candidate bookings
        #[arg(long)]
        candidates: PathBuf,

        #[arg(long)]
        bookings: Option<PathBuf>,
    },

    /// Confirm the booking block in an assistant reply
    Confirm {
        /// Text file holding the assistant reply
        #[arg(long)]
        reply: PathBuf,

        #[arg(long)]
        bookings: Option<PathBuf>,
    },

    /// Summarize bookings by status
    Stats {
        #[arg(long)]
        bookings: Option<PathBuf>,

        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

/// Runs one command and returns its JSON output.
pub fn run(command: Command, config: &AppConfig, catalog: Arc<Catalog>) -> Result<String> {
    match command {
        Command::Slots {
            procedure,
            clinic,
            days,
            max,
            bookings,
            today,
        } => {
            let mut request = SlotSearchRequest::with_defaults(procedure, config);
            request.preferred_clinic_id = clinic;
            if let Some(days) = days {
                request.days_ahead = days;
            }
            if let Some(max) = max {
                request.max_results = max;
            }
            request.validate()?;

            let snapshot = BookingSnapshot::new(load_bookings(bookings.as_deref())?)?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());

            let search = SlotSearchService::with_scope(catalog, config.conflict_scope);
            let slots = search.find_slots(&request, today, &snapshot);
            info!("{} slot(s) for {}", slots.len(), request.procedure_id);
            Ok(serde_json::to_string_pretty(&slots)?)
        }

        Command::Validate {
            candidates,
            bookings,
        } => {
            let candidates: Vec<BookingCandidate> = read_json(&candidates)?;
            let existing = load_bookings(bookings.as_deref())?;
            let stored_ids: HashSet<String> = existing.iter().map(|b| b.id.clone()).collect();
            let snapshot = BookingSnapshot::new(existing)?;

            let outcome = BulkConflictValidator::new(config.conflict_scope)
                .validate_batch(candidates, &snapshot, &stored_ids)?;
            Ok(serde_json::to_string_pretty(&outcome)?)
        }

        Command::Confirm { reply, bookings } => {
            let text = fs::read_to_string(&reply)
                .with_context(|| format!("reading {}", reply.display()))?;
            let Some(proposal) = ProposalParser::parse_booking(&text) else {
                bail!("no valid booking block in {}", reply.display());
            };
            debug!("Reply text: {}", ProposalParser::strip_booking(&text));

            let snapshot = BookingSnapshot::new(load_bookings(bookings.as_deref())?)?;
            let outcome = BookingService::with_scope(catalog, config.conflict_scope)
                .confirm_proposal(&proposal, &snapshot)?;
            Ok(serde_json::to_string_pretty(&outcome)?)
        }

        Command::Stats { bookings, today } => {
            let bookings = load_bookings(bookings.as_deref())?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let stats = AppointmentStats::compute(&bookings, today);
            Ok(serde_json::to_string_pretty(&stats)?)
        }
    }
}

fn load_bookings(path: Option<&Path>) -> Result<Vec<Booking>> {
    match path {
        Some(path) => read_json(path),
        None => Ok(Vec::new()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
