// libs/appointment-cell/src/services/slot_search.rs
//
// Deterministic slot finder. Scans days (earliest first), then clinics in
// catalog order, then doctors or doctor pairs in catalog order, and emits at
// most one slot per doctor (or pair) per day. Results are not ranked.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::{debug, instrument};

use clinic_cell::{Catalog, Clinic, Procedure, Room};
use doctor_cell::models::AvailabilitySet;
use doctor_cell::services::{AvailabilityService, DoctorMatchingService};
use shared_config::ConflictScope;
use shared_utils::time_grid::catalog_weekday_of;

use crate::models::{Booking, BookingSnapshot, Slot, SlotSearchRequest};
use crate::services::conflict::{ConflictDetectionService, ConflictQuery};

/// Everything fixed while scanning one clinic on one day.
struct DayScan<'a> {
    procedure: &'a Procedure,
    clinic: &'a Clinic,
    room: &'a Room,
    date: NaiveDate,
    weekday: u8,
    quanta: u32,
    day_bookings: &'a [Booking],
}

pub struct SlotSearchService {
    catalog: Arc<Catalog>,
    availability: AvailabilityService,
    matching: DoctorMatchingService,
    conflicts: ConflictDetectionService,
}

impl SlotSearchService {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_scope(catalog, ConflictScope::default())
    }

    pub fn with_scope(catalog: Arc<Catalog>, scope: ConflictScope) -> Self {
        Self {
            catalog,
            availability: AvailabilityService::new(),
            matching: DoctorMatchingService::new(),
            conflicts: ConflictDetectionService::new(scope),
        }
    }

    /// Bookable slots for `request` over `[today, today + days_ahead)`.
    ///
    /// An unknown procedure or preferred clinic yields no slots rather than
    /// an error. `snapshot` must hold the active bookings for the horizon.
    #[instrument(
        skip(self, snapshot),
        fields(
            procedure_id = %request.procedure_id,
            clinic = ?request.preferred_clinic_id,
            days_ahead = request.days_ahead
        )
    )]
    pub fn find_slots(
        &self,
        request: &SlotSearchRequest,
        today: NaiveDate,
        snapshot: &BookingSnapshot,
    ) -> Vec<Slot> {
        let Some(procedure) = self.catalog.get_procedure(&request.procedure_id) else {
            debug!("Unknown procedure {}, no slots", request.procedure_id);
            return Vec::new();
        };
        if request.max_results == 0 {
            return Vec::new();
        }

        let quanta = procedure.quanta_needed();
        let clinics = self
            .catalog
            .clinics_for_search(request.preferred_clinic_id.as_deref());
        let mut results = Vec::new();

        for day_offset in 0..request.days_ahead {
            if results.len() >= request.max_results * 2 {
                break;
            }
            let Some(date) = today.checked_add_days(Days::new(u64::from(day_offset))) else {
                break;
            };
            let weekday = catalog_weekday_of(date);
            let day_bookings = snapshot.day(date);

            for &clinic in &clinics {
                let Some(room) = Catalog::capable_room(clinic, procedure) else {
                    continue;
                };

                let scan = DayScan {
                    procedure,
                    clinic,
                    room,
                    date,
                    weekday,
                    quanta,
                    day_bookings,
                };

                if procedure.requires_anesthetist {
                    if self.scan_pairs(&scan, request.max_results, &mut results) {
                        debug!("Result cap {} reached on {}", request.max_results, date);
                        return results;
                    }
                } else {
                    self.scan_doctors(&scan, &mut results);
                }
            }
        }

        results.truncate(request.max_results);
        debug!("Found {} slot(s)", results.len());
        results
    }

    /// Surgeon x anesthetist pairs. Returns true once `max_results` is hit.
    fn scan_pairs(&self, scan: &DayScan<'_>, max_results: usize, results: &mut Vec<Slot>) -> bool {
        let (Some(primary_spec), Some(secondary_spec)) = (
            scan.procedure.primary_specialization(),
            scan.procedure.secondary_specialization(),
        ) else {
            return false;
        };

        for pair in self
            .matching
            .practitioner_pairs(self.catalog.doctors(), primary_spec, secondary_spec)
        {
            let joint = self
                .availability
                .joint_slots(&pair, &scan.clinic.id, scan.weekday);
            let doctor_ids = pair.doctor_ids();

            if let Some(start) = self.first_free_start(scan, &joint, &doctor_ids) {
                results.push(Self::slot(scan, start, doctor_ids, &pair.primary.id));
                if results.len() >= max_results {
                    return true;
                }
            }
        }
        false
    }

    fn scan_doctors(&self, scan: &DayScan<'_>, results: &mut Vec<Slot>) {
        let Some(primary_spec) = scan.procedure.primary_specialization() else {
            return;
        };

        for doctor in self
            .matching
            .doctors_with_specialization(self.catalog.doctors(), primary_spec)
        {
            let slots = self
                .availability
                .doctor_slots(doctor, &scan.clinic.id, scan.weekday);
            let doctor_ids = vec![doctor.id.clone()];

            if let Some(start) = self.first_free_start(scan, &slots, &doctor_ids) {
                results.push(Self::slot(scan, start, doctor_ids, &doctor.id));
            }
        }
    }

    /// Earliest contiguous start that clears the conflict check. A conflict
    /// moves on to the next start rather than giving up on the doctor.
    fn first_free_start(
        &self,
        scan: &DayScan<'_>,
        available: &AvailabilitySet,
        doctor_ids: &[String],
    ) -> Option<u32> {
        self.availability
            .contiguous_starts(available, scan.quanta)
            .find(|&start| {
                let query = ConflictQuery {
                    start_minute: start,
                    duration_minutes: scan.procedure.duration_minutes,
                    clinic_id: &scan.clinic.id,
                    room_id: &scan.room.id,
                    doctor_ids,
                };
                !self.conflicts.has_conflict(&query, scan.day_bookings)
            })
    }

    fn slot(scan: &DayScan<'_>, start: u32, doctor_ids: Vec<String>, primary_doctor_id: &str) -> Slot {
        Slot {
            procedure_id: scan.procedure.id.clone(),
            clinic_id: scan.clinic.id.clone(),
            room_id: scan.room.id.clone(),
            date: scan.date,
            start_minute: start,
            duration_minutes: scan.procedure.duration_minutes,
            doctor_ids,
            primary_doctor_id: primary_doctor_id.to_string(),
        }
    }
}
