// libs/appointment-cell/src/models.rs
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_config::AppConfig;
use shared_models::AppError;
use shared_utils::time_grid::{hhmm, minutes_to_time, MINUTES_PER_DAY};

pub const MAX_DAYS_AHEAD: u32 = 60;
pub const MAX_RESULTS: usize = 30;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

/// An existing appointment. Only active bookings take part in conflict
/// checks; cancelled ones are kept for history and never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub procedure_id: String,
    pub clinic_id: String,
    pub room_id: String,
    pub date: NaiveDate,
    #[serde(rename = "start_time", with = "hhmm")]
    pub start_minute: u32,
    #[serde(alias = "duration_mins")]
    pub duration_minutes: u32,
    pub doctor_ids: Vec<String>,
    #[serde(default)]
    pub primary_doctor_id: String,
    #[serde(default)]
    pub status: BookingStatus,
}

impl Booking {
    pub fn end_minute(&self) -> u32 {
        self.start_minute + self.duration_minutes
    }

    pub fn start_time(&self) -> String {
        minutes_to_time(self.start_minute)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn shares_doctor_with(&self, doctor_ids: &[String]) -> bool {
        doctor_ids.iter().any(|id| self.doctor_ids.contains(id))
    }

    /// Reject records whose interval math would be meaningless.
    pub fn validate(&self) -> Result<(), AppointmentError> {
        let invalid = |reason: String| {
            Err(AppointmentError::InvalidBooking {
                id: self.id.clone(),
                reason,
            })
        };

        if self.duration_minutes == 0 {
            return invalid("duration must be positive".to_string());
        }
        if self.end_minute() > MINUTES_PER_DAY {
            return invalid(format!(
                "{} + {} min runs past midnight",
                self.start_time(),
                self.duration_minutes
            ));
        }
        if self.doctor_ids.is_empty() {
            return invalid("no doctors assigned".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    #[serde(alias = "active")]
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Everything except a cancellation still occupies its room and doctors.
    pub fn is_active(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A proposed booking in a bulk batch. Same shape as [`Booking`], with an
/// optional externally-supplied id used for idempotent re-submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub procedure_id: String,
    pub clinic_id: String,
    pub room_id: String,
    pub date: NaiveDate,
    #[serde(rename = "start_time", with = "hhmm")]
    pub start_minute: u32,
    #[serde(alias = "duration_mins")]
    pub duration_minutes: u32,
    pub doctor_ids: Vec<String>,
    #[serde(default)]
    pub primary_doctor_id: String,
    #[serde(default)]
    pub status: BookingStatus,
}

impl BookingCandidate {
    pub fn into_booking(self, id: String) -> Booking {
        let primary_doctor_id = if self.primary_doctor_id.is_empty() {
            self.doctor_ids.first().cloned().unwrap_or_default()
        } else {
            self.primary_doctor_id
        };

        Booking {
            id,
            procedure_id: self.procedure_id,
            clinic_id: self.clinic_id,
            room_id: self.room_id,
            date: self.date,
            start_minute: self.start_minute,
            duration_minutes: self.duration_minutes,
            doctor_ids: self.doctor_ids,
            primary_doctor_id,
            status: self.status,
        }
    }
}

impl From<Booking> for BookingCandidate {
    fn from(booking: Booking) -> Self {
        Self {
            id: Some(booking.id).filter(|id| !id.is_empty()),
            procedure_id: booking.procedure_id,
            clinic_id: booking.clinic_id,
            room_id: booking.room_id,
            date: booking.date,
            start_minute: booking.start_minute,
            duration_minutes: booking.duration_minutes,
            doctor_ids: booking.doctor_ids,
            primary_doctor_id: booking.primary_doctor_id,
            status: booking.status,
        }
    }
}

// ==============================================================================
// BOOKING SNAPSHOT
// ==============================================================================

/// Point-in-time view of active bookings, grouped by calendar date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingSnapshot {
    by_date: BTreeMap<NaiveDate, Vec<Booking>>,
}

impl BookingSnapshot {
    /// Validates every record; cancelled bookings are dropped.
    pub fn new(bookings: impl IntoIterator<Item = Booking>) -> Result<Self, AppointmentError> {
        let mut snapshot = Self::default();
        for booking in bookings {
            booking.validate()?;
            snapshot.insert(booking);
        }
        Ok(snapshot)
    }

    /// Active bookings on `date`, in insertion order.
    pub fn day(&self, date: NaiveDate) -> &[Booking] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_date.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.values().all(Vec::is_empty)
    }

    pub fn bookings(&self) -> impl Iterator<Item = &Booking> {
        self.by_date.values().flatten()
    }

    pub(crate) fn insert(&mut self, booking: Booking) {
        if booking.is_active() {
            self.by_date.entry(booking.date).or_default().push(booking);
        }
    }
}

// ==============================================================================
// SLOT SEARCH MODELS
// ==============================================================================

/// A feasible, not-yet-persisted booking produced by slot search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub procedure_id: String,
    pub clinic_id: String,
    pub room_id: String,
    pub date: NaiveDate,
    #[serde(rename = "start_time", with = "hhmm")]
    pub start_minute: u32,
    pub duration_minutes: u32,
    pub doctor_ids: Vec<String>,
    pub primary_doctor_id: String,
}

impl Slot {
    pub fn start_time(&self) -> String {
        minutes_to_time(self.start_minute)
    }

    pub fn into_candidate(self) -> BookingCandidate {
        BookingCandidate {
            id: None,
            procedure_id: self.procedure_id,
            clinic_id: self.clinic_id,
            room_id: self.room_id,
            date: self.date,
            start_minute: self.start_minute,
            duration_minutes: self.duration_minutes,
            doctor_ids: self.doctor_ids,
            primary_doctor_id: self.primary_doctor_id,
            status: BookingStatus::Confirmed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSearchRequest {
    pub procedure_id: String,
    #[serde(default)]
    pub preferred_clinic_id: Option<String>,
    pub days_ahead: u32,
    pub max_results: usize,
}

impl SlotSearchRequest {
    pub fn new(procedure_id: impl Into<String>, days_ahead: u32, max_results: usize) -> Self {
        Self {
            procedure_id: procedure_id.into(),
            preferred_clinic_id: None,
            days_ahead,
            max_results,
        }
    }

    pub fn with_defaults(procedure_id: impl Into<String>, config: &AppConfig) -> Self {
        Self::new(procedure_id, config.default_days_ahead, config.default_max_results)
    }

    pub fn at_clinic(mut self, clinic_id: impl Into<String>) -> Self {
        self.preferred_clinic_id = Some(clinic_id.into());
        self
    }

    pub fn validate(&self) -> Result<(), AppointmentError> {
        if !(1..=MAX_DAYS_AHEAD).contains(&self.days_ahead) {
            return Err(AppointmentError::ValidationError(format!(
                "days_ahead must be between 1 and {}, got {}",
                MAX_DAYS_AHEAD, self.days_ahead
            )));
        }
        if !(1..=MAX_RESULTS).contains(&self.max_results) {
            return Err(AppointmentError::ValidationError(format!(
                "max_results must be between 1 and {}, got {}",
                MAX_RESULTS, self.max_results
            )));
        }
        Ok(())
    }
}

// ==============================================================================
// SINGLE BOOKING AND PROPOSAL MODELS
// ==============================================================================

/// One appointment as requested by a caller or proposed by the assistant.
/// Room and duration are always resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub procedure_id: String,
    pub clinic_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    #[serde(default)]
    pub primary_doctor_id: String,
    pub doctor_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingProposal {
    pub patient_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_phone: Option<String>,
    pub appointments: Vec<BookingRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingDecision {
    Accepted(Booking),
    Conflict {
        booking: Booking,
        conflicts: Vec<Booking>,
    },
}

impl BookingDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BookingDecision::Accepted(_))
    }

    pub fn booking(&self) -> &Booking {
        match self {
            BookingDecision::Accepted(booking) => booking,
            BookingDecision::Conflict { booking, .. } => booking,
        }
    }
}

// ==============================================================================
// BULK IMPORT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CandidateOutcome {
    Imported { id: String },
    Duplicate { id: String },
    Conflict { conflicting_ids: Vec<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkImportOutcome {
    pub imported: usize,
    pub skipped: usize,
    /// Accepted candidates, in input order, ready to be committed.
    pub accepted: Vec<Booking>,
    /// One entry per input candidate, in input order.
    pub outcomes: Vec<CandidateOutcome>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug, PartialEq)]
pub enum AppointmentError {
    #[error("Unknown procedure: {0}")]
    UnknownProcedure(String),

    #[error("Unknown clinic: {0}")]
    UnknownClinic(String),

    #[error("Clinic {clinic_id} cannot handle {procedure_id}")]
    ClinicCannotHandle {
        clinic_id: String,
        procedure_id: String,
    },

    #[error("Unknown doctor: {0}")]
    UnknownDoctor(String),

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Invalid booking {id}: {reason}")]
    InvalidBooking { id: String, reason: String },

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<AppError> for AppointmentError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::FormatError(msg) => AppointmentError::InvalidTime(msg),
            other => AppointmentError::ValidationError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn booking(start: u32, duration: u32, status: BookingStatus) -> Booking {
        Booking {
            id: "b1".to_string(),
            procedure_id: "filling".to_string(),
            clinic_id: "downtown".to_string(),
            room_id: "R1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            start_minute: start,
            duration_minutes: duration,
            doctor_ids: vec!["dr_chen".to_string()],
            primary_doctor_id: "dr_chen".to_string(),
            status,
        }
    }

    #[test]
    fn test_booking_deserializes_wire_shape() {
        let raw = r#"{
            "id": "a1", "clinic_id": "downtown", "room_id": "R2", "date": "2025-03-04",
            "start_time": "09:00", "duration_mins": 75, "doctor_ids": ["dr_morgan"],
            "status": "active"
        }"#;
        let parsed: Booking = serde_json::from_str(raw).unwrap();

        assert_eq!(parsed.start_minute, 540);
        assert_eq!(parsed.end_minute(), 615);
        assert_eq!(parsed.status, BookingStatus::Confirmed);
        assert!(parsed.is_active());
    }

    #[test]
    fn test_booking_rejects_malformed_wire_values() {
        let bad_time = r#"{"clinic_id":"d","room_id":"R1","date":"2025-03-04","start_time":"9am","duration_minutes":30,"doctor_ids":["x"]}"#;
        let negative = r#"{"clinic_id":"d","room_id":"R1","date":"2025-03-04","start_time":"09:00","duration_minutes":-30,"doctor_ids":["x"]}"#;

        assert!(serde_json::from_str::<Booking>(bad_time).is_err());
        assert!(serde_json::from_str::<Booking>(negative).is_err());
    }

    #[test]
    fn test_booking_validate() {
        assert!(booking(540, 30, BookingStatus::Confirmed).validate().is_ok());
        assert_matches!(
            booking(540, 0, BookingStatus::Confirmed).validate(),
            Err(AppointmentError::InvalidBooking { .. })
        );
        assert_matches!(
            booking(23 * 60 + 30, 45, BookingStatus::Confirmed).validate(),
            Err(AppointmentError::InvalidBooking { .. })
        );

        let mut unstaffed = booking(540, 30, BookingStatus::Confirmed);
        unstaffed.doctor_ids.clear();
        assert!(unstaffed.validate().is_err());
    }

    #[test]
    fn test_snapshot_drops_cancelled_and_groups_by_date() {
        let mut other_day = booking(600, 30, BookingStatus::Completed);
        other_day.date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();

        let snapshot = BookingSnapshot::new(vec![
            booking(540, 30, BookingStatus::Confirmed),
            booking(570, 30, BookingStatus::Cancelled),
            other_day,
        ])
        .unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.day(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()).len(), 1);
        assert_eq!(snapshot.day(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()).len(), 1);
        assert!(snapshot.day(NaiveDate::from_ymd_opt(2025, 3, 6).unwrap()).is_empty());
    }

    #[test]
    fn test_snapshot_fails_loudly_on_bad_record() {
        let result = BookingSnapshot::new(vec![booking(540, 0, BookingStatus::Confirmed)]);
        assert_matches!(result, Err(AppointmentError::InvalidBooking { .. }));
    }

    #[test]
    fn test_search_request_bounds() {
        assert!(SlotSearchRequest::new("filling", 14, 8).validate().is_ok());
        assert!(SlotSearchRequest::new("filling", 0, 8).validate().is_err());
        assert!(SlotSearchRequest::new("filling", 61, 8).validate().is_err());
        assert!(SlotSearchRequest::new("filling", 14, 0).validate().is_err());
        assert!(SlotSearchRequest::new("filling", 14, 31).validate().is_err());

        let request = SlotSearchRequest::with_defaults("filling", &AppConfig::default()).at_clinic("westside");
        assert_eq!(request.days_ahead, 14);
        assert_eq!(request.max_results, 8);
        assert_eq!(request.preferred_clinic_id.as_deref(), Some("westside"));
    }

    #[test]
    fn test_format_error_maps_to_invalid_time() {
        let err: AppointmentError = AppError::FormatError("bad".to_string()).into();
        assert_eq!(err, AppointmentError::InvalidTime("bad".to_string()));
    }
}
