// libs/appointment-cell/tests/booking_flow_test.rs
//
// End-to-end flows: search, propose, confirm, cancel, re-search.

use std::collections::HashSet;
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;

use appointment_cell::models::{
    AppointmentError, Booking, BookingCandidate, BookingSnapshot, BookingStatus, CandidateOutcome,
    SlotSearchRequest,
};
use appointment_cell::services::{
    AppointmentStats, BookingLifecycle, BookingService, BulkConflictValidator, ProposalParser,
    SlotSearchService,
};
use clinic_cell::fixtures::meddent_catalog;
use clinic_cell::Catalog;

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

fn catalog() -> Arc<Catalog> {
    Arc::new(meddent_catalog().unwrap())
}

fn assistant_reply(appointments: &str) -> String {
    format!(
        "Perfect, I have booked that for you.\n[BOOKING_REQUEST]\n{{\"patient_name\": \"Ana Lopez\", \"appointments\": [{}]}}\n[/BOOKING_REQUEST]",
        appointments
    )
}

const RCT_CONSULT_AT_TEN: &str = r#"{"procedure_id": "rct_consult", "clinic_id": "downtown", "date": "2025-03-03",
    "start_time": "10:00", "primary_doctor_id": "dr_morgan", "doctor_ids": ["dr_morgan"]}"#;
const RCT_TREATMENT_AT_TEN_TWENTY: &str = r#"{"procedure_id": "rct_treatment", "clinic_id": "downtown", "date": "2025-03-03",
    "start_time": "10:20", "primary_doctor_id": "dr_morgan", "doctor_ids": ["dr_morgan"]}"#;
const RCT_TREATMENT_AT_TEN: &str = r#"{"procedure_id": "rct_treatment", "clinic_id": "downtown", "date": "2025-03-03",
    "start_time": "10:00", "primary_doctor_id": "dr_morgan", "doctor_ids": ["dr_morgan"]}"#;

// ==============================================================================
// PROPOSAL CONFIRMATION
// ==============================================================================

#[test]
fn test_consult_and_treatment_same_day_are_both_accepted() {
    let service = BookingService::new(catalog());
    let reply = assistant_reply(&format!("{},{}", RCT_CONSULT_AT_TEN, RCT_TREATMENT_AT_TEN_TWENTY));

    let proposal = ProposalParser::parse_booking(&reply).unwrap();
    assert_eq!(ProposalParser::strip_booking(&reply), "Perfect, I have booked that for you.");

    let outcome = service
        .confirm_proposal(&proposal, &BookingSnapshot::default())
        .unwrap();

    assert_eq!(outcome.imported, 2);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(outcome.accepted[0].room_id, "R2");
    assert_eq!(outcome.accepted[0].duration_minutes, 20);
    assert_eq!(outcome.accepted[1].start_time(), "10:20");
}

#[test]
fn test_overlapping_proposed_appointments_keep_the_first() {
    let service = BookingService::new(catalog());
    let reply = assistant_reply(&format!("{},{}", RCT_CONSULT_AT_TEN, RCT_TREATMENT_AT_TEN));
    let proposal = ProposalParser::parse_booking(&reply).unwrap();

    let outcome = service
        .confirm_proposal(&proposal, &BookingSnapshot::default())
        .unwrap();

    assert_eq!(outcome.imported, 1);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(
        outcome.outcomes[1],
        CandidateOutcome::Conflict {
            conflicting_ids: vec![outcome.accepted[0].id.clone()]
        }
    );
}

#[test]
fn test_proposal_at_incapable_clinic_is_rejected_whole() {
    let service = BookingService::new(catalog());
    let westside = RCT_TREATMENT_AT_TEN.replace("downtown", "westside");
    let reply = assistant_reply(&format!("{},{}", RCT_CONSULT_AT_TEN, westside));
    let proposal = ProposalParser::parse_booking(&reply).unwrap();

    let result = service.confirm_proposal(&proposal, &BookingSnapshot::default());

    assert_matches!(result, Err(AppointmentError::ClinicCannotHandle { .. }));
}

// ==============================================================================
// SEARCH, BOOK, CANCEL
// ==============================================================================

#[test]
fn test_booked_slot_disappears_and_returns_after_cancel() {
    let catalog = catalog();
    let search = SlotSearchService::new(catalog.clone());
    let validator = BulkConflictValidator::default();
    let request = SlotSearchRequest::new("rct_treatment", 1, 8);

    let first = search.find_slots(&request, monday(), &BookingSnapshot::default());
    assert_eq!(first[0].start_time(), "10:00");

    let outcome = validator
        .validate_batch(
            vec![first[0].clone().into_candidate()],
            &BookingSnapshot::default(),
            &HashSet::new(),
        )
        .unwrap();
    let mut stored: Vec<Booking> = outcome.accepted;

    let after_booking = search.find_slots(&request, monday(), &BookingSnapshot::new(stored.clone()).unwrap());
    assert_eq!(after_booking[0].start_time(), "11:15");

    BookingLifecycle::new().cancel(&mut stored[0]).unwrap();
    let after_cancel = search.find_slots(&request, monday(), &BookingSnapshot::new(stored.clone()).unwrap());
    assert_eq!(after_cancel[0].start_time(), "10:00");
}

#[test]
fn test_resubmitting_a_batch_is_idempotent() {
    let validator = BulkConflictValidator::default();
    let candidate = BookingCandidate {
        id: Some("import-1".to_string()),
        procedure_id: "filling".to_string(),
        clinic_id: "downtown".to_string(),
        room_id: "R1".to_string(),
        date: monday(),
        start_minute: 9 * 60,
        duration_minutes: 45,
        doctor_ids: vec!["dr_chen".to_string()],
        primary_doctor_id: "dr_chen".to_string(),
        status: BookingStatus::Confirmed,
    };

    let first = validator
        .validate_batch(vec![candidate.clone()], &BookingSnapshot::default(), &HashSet::new())
        .unwrap();
    assert_eq!(first.imported, 1);

    let stored_ids: HashSet<String> = first.accepted.iter().map(|b| b.id.clone()).collect();
    let snapshot = BookingSnapshot::new(first.accepted).unwrap();
    let second = validator
        .validate_batch(vec![candidate], &snapshot, &stored_ids)
        .unwrap();

    assert_eq!(second.imported, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(second.outcomes, vec![CandidateOutcome::Duplicate { id: "import-1".to_string() }]);
}

// ==============================================================================
// STATS
// ==============================================================================

#[test]
fn test_stats_follow_lifecycle() {
    let service = BookingService::new(catalog());
    let reply = assistant_reply(&format!("{},{}", RCT_CONSULT_AT_TEN, RCT_TREATMENT_AT_TEN_TWENTY));
    let proposal = ProposalParser::parse_booking(&reply).unwrap();
    let mut stored = service
        .confirm_proposal(&proposal, &BookingSnapshot::default())
        .unwrap()
        .accepted;

    let lifecycle = BookingLifecycle::new();
    lifecycle.complete(&mut stored[0]).unwrap();

    let stats = AppointmentStats::compute(&stored, monday());
    assert_eq!(stats.total, 1);
    assert_eq!(stats.today, 1);
    assert_eq!(stats.this_week, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.cancelled, 0);

    lifecycle.cancel(&mut stored[1]).unwrap();
    let stats = AppointmentStats::compute(&stored, monday());
    assert_eq!(stats.total, 0);
    assert_eq!(stats.cancelled, 1);
}
