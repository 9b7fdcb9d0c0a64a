// libs/appointment-cell/src/services/conflict.rs
use tracing::debug;

use shared_config::ConflictScope;

use crate::models::{Booking, BookingCandidate};

/// The interval and resources a candidate booking would occupy.
#[derive(Debug, Clone, Copy)]
pub struct ConflictQuery<'a> {
    pub start_minute: u32,
    pub duration_minutes: u32,
    pub clinic_id: &'a str,
    pub room_id: &'a str,
    pub doctor_ids: &'a [String],
}

impl<'a> ConflictQuery<'a> {
    pub fn end_minute(&self) -> u32 {
        self.start_minute + self.duration_minutes
    }

    pub fn for_booking(booking: &'a Booking) -> Self {
        Self {
            start_minute: booking.start_minute,
            duration_minutes: booking.duration_minutes,
            clinic_id: &booking.clinic_id,
            room_id: &booking.room_id,
            doctor_ids: &booking.doctor_ids,
        }
    }

    pub fn for_candidate(candidate: &'a BookingCandidate) -> Self {
        Self {
            start_minute: candidate.start_minute,
            duration_minutes: candidate.duration_minutes,
            clinic_id: &candidate.clinic_id,
            room_id: &candidate.room_id,
            doctor_ids: &candidate.doctor_ids,
        }
    }
}

/// Decides whether a candidate collides with a day's existing bookings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDetectionService {
    scope: ConflictScope,
}

impl ConflictDetectionService {
    pub fn new(scope: ConflictScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> ConflictScope {
        self.scope
    }

    /// `day_bookings` must all share the candidate's calendar date.
    pub fn has_conflict(&self, query: &ConflictQuery<'_>, day_bookings: &[Booking]) -> bool {
        day_bookings.iter().any(|booking| self.clashes(query, booking))
    }

    /// Every booking in `day_bookings` the candidate collides with.
    pub fn find_conflicts<'b>(
        &self,
        query: &ConflictQuery<'_>,
        day_bookings: &'b [Booking],
    ) -> Vec<&'b Booking> {
        let conflicts: Vec<&Booking> = day_bookings
            .iter()
            .filter(|booking| self.clashes(query, booking))
            .collect();

        if !conflicts.is_empty() {
            debug!(
                "Candidate {}+{}min in {}/{} conflicts with {} booking(s)",
                query.start_minute,
                query.duration_minutes,
                query.clinic_id,
                query.room_id,
                conflicts.len()
            );
        }
        conflicts
    }

    fn clashes(&self, query: &ConflictQuery<'_>, booking: &Booking) -> bool {
        if !booking.is_active() {
            return false;
        }

        // Half-open intervals: touching end-to-start is not an overlap.
        if query.end_minute() <= booking.start_minute || query.start_minute >= booking.end_minute() {
            return false;
        }

        let same_clinic = booking.clinic_id == query.clinic_id;
        let same_room = same_clinic && booking.room_id == query.room_id;
        let shares_doctor = booking.shares_doctor_with(query.doctor_ids);

        match self.scope {
            ConflictScope::Clinic => same_clinic && (same_room || shares_doctor),
            ConflictScope::Global => same_room || shares_doctor,
        }
    }
}
