// libs/appointment-cell/src/services/bulk.rs
use std::collections::HashSet;

use tracing::{debug, info};
use uuid::Uuid;

use shared_config::ConflictScope;

use crate::models::{
    AppointmentError, BookingCandidate, BookingSnapshot, BulkImportOutcome, CandidateOutcome,
};
use crate::services::conflict::{ConflictDetectionService, ConflictQuery};

/// Validates a batch of candidates in input order. Each accepted candidate
/// joins the working snapshot, so later candidates see it as booked.
#[derive(Debug, Clone, Copy, Default)]
pub struct BulkConflictValidator {
    conflicts: ConflictDetectionService,
}

impl BulkConflictValidator {
    pub fn new(scope: ConflictScope) -> Self {
        Self {
            conflicts: ConflictDetectionService::new(scope),
        }
    }

    /// `existing` holds the active bookings for the dates the batch touches;
    /// `stored_ids` every booking id already persisted, cancelled ones
    /// included. A candidate whose id is in `stored_ids`, or was accepted
    /// earlier in the batch, is a duplicate and skipped unchecked.
    ///
    /// Fails on the first malformed candidate without accepting anything.
    pub fn validate_batch(
        &self,
        candidates: Vec<BookingCandidate>,
        existing: &BookingSnapshot,
        stored_ids: &HashSet<String>,
    ) -> Result<BulkImportOutcome, AppointmentError> {
        debug!("Validating batch of {} candidate(s)", candidates.len());

        let mut working = existing.clone();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut outcome = BulkImportOutcome::default();

        for candidate in candidates {
            if let Some(id) = candidate.id.as_deref() {
                if stored_ids.contains(id) || seen_ids.contains(id) {
                    debug!("Skipping duplicate booking {}", id);
                    outcome.skipped += 1;
                    outcome.outcomes.push(CandidateOutcome::Duplicate { id: id.to_string() });
                    continue;
                }
            }

            let query = ConflictQuery::for_candidate(&candidate);
            let conflicting_ids: Vec<String> = if candidate.status.is_active() {
                self.conflicts
                    .find_conflicts(&query, working.day(candidate.date))
                    .into_iter()
                    .map(|booking| booking.id.clone())
                    .collect()
            } else {
                Vec::new()
            };

            let id = candidate
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            let booking = candidate.into_booking(id.clone());
            booking.validate()?;

            if !conflicting_ids.is_empty() {
                outcome.skipped += 1;
                outcome.outcomes.push(CandidateOutcome::Conflict { conflicting_ids });
                continue;
            }

            seen_ids.insert(id.clone());
            working.insert(booking.clone());
            outcome.accepted.push(booking);
            outcome.imported += 1;
            outcome.outcomes.push(CandidateOutcome::Imported { id });
        }

        info!(
            imported = outcome.imported,
            skipped = outcome.skipped,
            "Bulk validation complete"
        );
        Ok(outcome)
    }
}
