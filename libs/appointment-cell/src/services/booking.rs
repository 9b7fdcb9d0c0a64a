// libs/appointment-cell/src/services/booking.rs
use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use clinic_cell::Catalog;
use shared_config::ConflictScope;
use shared_utils::time_grid::time_to_minutes;

use crate::models::{
    AppointmentError, Booking, BookingCandidate, BookingDecision, BookingProposal, BookingRequest,
    BookingSnapshot, BookingStatus, BulkImportOutcome,
};
use crate::services::bulk::BulkConflictValidator;
use crate::services::conflict::{ConflictDetectionService, ConflictQuery};

/// Turns caller or assistant booking requests into concrete bookings.
pub struct BookingService {
    catalog: Arc<Catalog>,
    conflicts: ConflictDetectionService,
    bulk: BulkConflictValidator,
}

impl BookingService {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_scope(catalog, ConflictScope::default())
    }

    pub fn with_scope(catalog: Arc<Catalog>, scope: ConflictScope) -> Self {
        Self {
            catalog,
            conflicts: ConflictDetectionService::new(scope),
            bulk: BulkConflictValidator::new(scope),
        }
    }

    /// Resolve room and duration from the catalog and check every reference.
    /// The returned booking is confirmed and carries a fresh id.
    pub fn resolve_request(&self, request: &BookingRequest) -> Result<Booking, AppointmentError> {
        let procedure = self
            .catalog
            .get_procedure(&request.procedure_id)
            .ok_or_else(|| AppointmentError::UnknownProcedure(request.procedure_id.clone()))?;
        let clinic = self
            .catalog
            .get_clinic(&request.clinic_id)
            .ok_or_else(|| AppointmentError::UnknownClinic(request.clinic_id.clone()))?;
        let room = Catalog::capable_room(clinic, procedure).ok_or_else(|| {
            AppointmentError::ClinicCannotHandle {
                clinic_id: clinic.id.clone(),
                procedure_id: procedure.id.clone(),
            }
        })?;

        if let Some(unknown) = request
            .doctor_ids
            .iter()
            .chain(std::iter::once(&request.primary_doctor_id).filter(|id| !id.is_empty()))
            .find(|id| self.catalog.get_doctor(id).is_none())
        {
            return Err(AppointmentError::UnknownDoctor(unknown.clone()));
        }

        let start_minute = time_to_minutes(&request.start_time)?;

        let primary_doctor_id = if request.primary_doctor_id.is_empty() {
            request.doctor_ids.first().cloned().unwrap_or_default()
        } else if request.doctor_ids.contains(&request.primary_doctor_id) {
            request.primary_doctor_id.clone()
        } else {
            return Err(AppointmentError::ValidationError(format!(
                "primary doctor {} is not among the assigned doctors",
                request.primary_doctor_id
            )));
        };

        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            procedure_id: procedure.id.clone(),
            clinic_id: clinic.id.clone(),
            room_id: room.id.clone(),
            date: request.date,
            start_minute,
            duration_minutes: procedure.duration_minutes,
            doctor_ids: request.doctor_ids.clone(),
            primary_doctor_id,
            status: BookingStatus::Confirmed,
        };
        booking.validate()?;

        debug!(
            "Resolved {} at {}/{} on {} {}",
            booking.procedure_id,
            booking.clinic_id,
            booking.room_id,
            booking.date,
            booking.start_time()
        );
        Ok(booking)
    }

    /// Resolve a single request and check it against the existing bookings.
    pub fn validate_booking(
        &self,
        request: &BookingRequest,
        existing: &BookingSnapshot,
    ) -> Result<BookingDecision, AppointmentError> {
        let booking = self.resolve_request(request)?;

        let conflicts: Vec<Booking> = self
            .conflicts
            .find_conflicts(&ConflictQuery::for_booking(&booking), existing.day(booking.date))
            .into_iter()
            .cloned()
            .collect();

        if conflicts.is_empty() {
            info!("Booking {} accepted", booking.id);
            Ok(BookingDecision::Accepted(booking))
        } else {
            warn!(
                "Booking request for {} on {} conflicts with {} booking(s)",
                booking.procedure_id,
                booking.date,
                conflicts.len()
            );
            Ok(BookingDecision::Conflict { booking, conflicts })
        }
    }

    /// Resolve every proposed appointment, then run them through the bulk
    /// validator in proposal order. Any unresolvable appointment rejects the
    /// whole proposal.
    pub fn confirm_proposal(
        &self,
        proposal: &BookingProposal,
        existing: &BookingSnapshot,
    ) -> Result<BulkImportOutcome, AppointmentError> {
        info!(
            "Confirming proposal for {} with {} appointment(s)",
            proposal.patient_name,
            proposal.appointments.len()
        );

        let candidates = proposal
            .appointments
            .iter()
            .map(|request| self.resolve_request(request).map(BookingCandidate::from))
            .collect::<Result<Vec<_>, _>>()?;

        self.bulk.validate_batch(candidates, existing, &HashSet::new())
    }
}
