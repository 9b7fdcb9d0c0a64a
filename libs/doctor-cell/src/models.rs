// libs/doctor-cell/src/models.rs
use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::AppError;

/// Quantized start-minutes at which a doctor is on duty, ascending.
pub type AvailabilitySet = BTreeSet<u32>;

// ==============================================================================
// DOCTOR MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub specializations: BTreeSet<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub availability: Vec<AvailabilityWindow>,
}

impl Doctor {
    pub fn has_specialization(&self, specialization: &str) -> bool {
        self.specializations.contains(specialization)
    }

    /// First window for `clinic_id` that includes `weekday` (Sunday=0).
    pub fn window_for(&self, clinic_id: &str, weekday: u8) -> Option<&AvailabilityWindow> {
        self.availability
            .iter()
            .find(|window| window.covers(clinic_id, weekday))
    }

    pub fn validate(&self) -> Result<(), DoctorError> {
        if self.specializations.is_empty() {
            return Err(DoctorError::MissingSpecializations(self.id.clone()));
        }

        let mut seen = HashSet::new();
        for window in &self.availability {
            window.validate().map_err(|reason| DoctorError::InvalidWindow {
                doctor_id: self.id.clone(),
                reason,
            })?;

            for day in &window.days {
                if !seen.insert((window.clinic_id.as_str(), *day)) {
                    return Err(DoctorError::OverlappingWindows {
                        doctor_id: self.id.clone(),
                        clinic_id: window.clinic_id.clone(),
                        weekday: *day,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Recurring weekly on-duty interval at one clinic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub clinic_id: String,
    /// Weekdays, 0 = Sunday .. 6 = Saturday
    pub days: BTreeSet<u8>,
    pub start_hour: u8,
    pub end_hour: u8,
}

impl AvailabilityWindow {
    pub fn covers(&self, clinic_id: &str, weekday: u8) -> bool {
        self.clinic_id == clinic_id && self.days.contains(&weekday)
    }

    pub fn start_minute(&self) -> u32 {
        u32::from(self.start_hour) * 60
    }

    pub fn end_minute(&self) -> u32 {
        u32::from(self.end_hour) * 60
    }

    fn validate(&self) -> Result<(), String> {
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(format!(
                "window at {} must satisfy 0 <= start < end <= 24, got {}-{}",
                self.clinic_id, self.start_hour, self.end_hour
            ));
        }
        if let Some(day) = self.days.iter().find(|day| **day > 6) {
            return Err(format!(
                "window at {} lists weekday {} outside 0 (Sunday) ..= 6 (Saturday)",
                self.clinic_id, day
            ));
        }
        Ok(())
    }
}

/// Two distinct practitioners booked together, e.g. surgeon and anesthetist.
#[derive(Debug, Clone, Copy)]
pub struct DoctorPair<'a> {
    pub primary: &'a Doctor,
    pub secondary: &'a Doctor,
}

impl DoctorPair<'_> {
    pub fn doctor_ids(&self) -> Vec<String> {
        vec![self.primary.id.clone(), self.secondary.id.clone()]
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug, PartialEq)]
pub enum DoctorError {
    #[error("Doctor {0} has no specializations")]
    MissingSpecializations(String),

    #[error("Doctor {doctor_id} has an invalid availability window: {reason}")]
    InvalidWindow { doctor_id: String, reason: String },

    #[error("Doctor {doctor_id} has more than one window for clinic {clinic_id} on weekday {weekday}")]
    OverlappingWindows {
        doctor_id: String,
        clinic_id: String,
        weekday: u8,
    },
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(clinic: &str, days: &[u8], start: u8, end: u8) -> AvailabilityWindow {
        AvailabilityWindow {
            clinic_id: clinic.to_string(),
            days: days.iter().copied().collect(),
            start_hour: start,
            end_hour: end,
        }
    }

    fn doctor(specs: &[&str], availability: Vec<AvailabilityWindow>) -> Doctor {
        Doctor {
            id: "dr_test".to_string(),
            name: "Dr. Test".to_string(),
            title: String::new(),
            specializations: specs.iter().map(|s| s.to_string()).collect(),
            bio: String::new(),
            availability,
        }
    }

    #[test]
    fn test_window_for_matches_clinic_and_day() {
        let doc = doctor(
            &["general"],
            vec![window("downtown", &[1, 2], 9, 17), window("westside", &[6], 9, 13)],
        );

        assert_eq!(doc.window_for("downtown", 2).map(|w| w.start_hour), Some(9));
        assert_eq!(doc.window_for("westside", 6).map(|w| w.end_hour), Some(13));
        assert!(doc.window_for("westside", 1).is_none());
        assert!(doc.window_for("uptown", 1).is_none());
    }

    #[test]
    fn test_validate_rejects_empty_specializations() {
        let doc = doctor(&[], vec![]);
        assert_eq!(
            doc.validate(),
            Err(DoctorError::MissingSpecializations("dr_test".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_bad_hours_and_days() {
        assert!(doctor(&["general"], vec![window("downtown", &[1], 17, 9)]).validate().is_err());
        assert!(doctor(&["general"], vec![window("downtown", &[1], 9, 25)]).validate().is_err());
        assert!(doctor(&["general"], vec![window("downtown", &[7], 9, 17)]).validate().is_err());
        assert!(doctor(&["general"], vec![window("downtown", &[0, 6], 0, 24)]).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_clinic_weekday() {
        let doc = doctor(
            &["general"],
            vec![window("downtown", &[1, 3], 9, 12), window("downtown", &[3], 13, 17)],
        );
        assert_eq!(
            doc.validate(),
            Err(DoctorError::OverlappingWindows {
                doctor_id: "dr_test".to_string(),
                clinic_id: "downtown".to_string(),
                weekday: 3,
            })
        );
    }
}
