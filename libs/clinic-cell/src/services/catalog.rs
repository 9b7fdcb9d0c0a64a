// libs/clinic-cell/src/services/catalog.rs
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use doctor_cell::models::Doctor;
use shared_models::AppError;

use crate::models::{Clinic, Procedure, Room, Specialization};

/// Immutable reference data: clinics with their rooms, doctors, procedures
/// and specializations. Built once, validated, then shared read-only
/// (typically behind an `Arc`). Every list keeps its source order, which is
/// the order slot search scans in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    clinics: Vec<Clinic>,
    doctors: Vec<Doctor>,
    procedures: Vec<Procedure>,
    #[serde(default)]
    specializations: Vec<Specialization>,
}

impl Catalog {
    pub fn new(
        clinics: Vec<Clinic>,
        doctors: Vec<Doctor>,
        procedures: Vec<Procedure>,
        specializations: Vec<Specialization>,
    ) -> Result<Self, AppError> {
        let catalog = Self {
            clinics,
            doctors,
            procedures,
            specializations,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        debug!("Loading catalog from {}", path.display());

        let raw = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&raw)?;

        info!(
            clinics = catalog.clinics.len(),
            doctors = catalog.doctors.len(),
            procedures = catalog.procedures.len(),
            "Catalog loaded from {}",
            path.display()
        );
        Ok(catalog)
    }

    pub fn clinics(&self) -> &[Clinic] {
        &self.clinics
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn procedures(&self) -> &[Procedure] {
        &self.procedures
    }

    pub fn specializations(&self) -> &[Specialization] {
        &self.specializations
    }

    pub fn get_clinic(&self, clinic_id: &str) -> Option<&Clinic> {
        self.clinics.iter().find(|clinic| clinic.id == clinic_id)
    }

    pub fn get_doctor(&self, doctor_id: &str) -> Option<&Doctor> {
        self.doctors.iter().find(|doctor| doctor.id == doctor_id)
    }

    pub fn get_procedure(&self, procedure_id: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|procedure| procedure.id == procedure_id)
    }

    pub fn get_specialization(&self, specialization_id: &str) -> Option<&Specialization> {
        self.specializations
            .iter()
            .find(|specialization| specialization.id == specialization_id)
    }

    /// First room of `clinic_id` able to host `procedure_id`. `None` for an
    /// unknown clinic or procedure, or when no room has every capability.
    pub fn find_room_for_procedure(&self, clinic_id: &str, procedure_id: &str) -> Option<&Room> {
        let procedure = self.get_procedure(procedure_id)?;
        let clinic = self.get_clinic(clinic_id)?;
        Self::capable_room(clinic, procedure)
    }

    pub fn capable_room<'a>(clinic: &'a Clinic, procedure: &Procedure) -> Option<&'a Room> {
        clinic.rooms.iter().find(|room| room.satisfies(procedure))
    }

    /// Clinics a search should visit: every clinic, or only the preferred
    /// one. An unknown preference yields no clinics.
    pub fn clinics_for_search(&self, preferred_clinic_id: Option<&str>) -> Vec<&Clinic> {
        match preferred_clinic_id {
            Some(clinic_id) => self.get_clinic(clinic_id).into_iter().collect(),
            None => self.clinics.iter().collect(),
        }
    }

    pub fn follow_up_for(&self, procedure_id: &str) -> Option<&Procedure> {
        let follow_up = self.get_procedure(procedure_id)?.follow_up.as_ref()?;
        self.get_procedure(&follow_up.procedure_id)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |msg: String| Err(AppError::ValidationError(msg));

        let mut clinic_ids = HashSet::new();
        for clinic in &self.clinics {
            if !clinic_ids.insert(clinic.id.as_str()) {
                return invalid(format!("duplicate clinic id {}", clinic.id));
            }
            let mut room_ids = HashSet::new();
            for room in &clinic.rooms {
                if !room_ids.insert(room.id.as_str()) {
                    return invalid(format!("duplicate room id {} in clinic {}", room.id, clinic.id));
                }
            }
        }

        let known_specs: HashSet<&str> = self
            .specializations
            .iter()
            .map(|specialization| specialization.id.as_str())
            .collect();
        let check_spec = |owner: &str, spec: &str| -> Result<(), AppError> {
            if !known_specs.is_empty() && !known_specs.contains(spec) {
                return Err(AppError::ValidationError(format!(
                    "{} references unknown specialization {}",
                    owner, spec
                )));
            }
            Ok(())
        };

        let mut doctor_ids = HashSet::new();
        for doctor in &self.doctors {
            if !doctor_ids.insert(doctor.id.as_str()) {
                return invalid(format!("duplicate doctor id {}", doctor.id));
            }
            doctor.validate()?;
            for spec in &doctor.specializations {
                check_spec(&doctor.id, spec)?;
            }
            if let Some(window) = doctor
                .availability
                .iter()
                .find(|window| !clinic_ids.contains(window.clinic_id.as_str()))
            {
                return invalid(format!(
                    "doctor {} has availability at unknown clinic {}",
                    doctor.id, window.clinic_id
                ));
            }
        }

        let procedure_ids: HashSet<&str> =
            self.procedures.iter().map(|procedure| procedure.id.as_str()).collect();
        if procedure_ids.len() != self.procedures.len() {
            return invalid("duplicate procedure id".to_string());
        }

        for procedure in &self.procedures {
            if procedure.duration_minutes == 0 {
                return invalid(format!("procedure {} has zero duration", procedure.id));
            }
            let roles_needed = if procedure.requires_anesthetist { 2 } else { 1 };
            if procedure.required_specializations.len() < roles_needed {
                return invalid(format!(
                    "procedure {} needs at least {} required specialization(s)",
                    procedure.id, roles_needed
                ));
            }
            for spec in &procedure.required_specializations {
                check_spec(&procedure.id, spec)?;
            }
            if let Some(follow_up) = &procedure.follow_up {
                if !procedure_ids.contains(follow_up.procedure_id.as_str()) {
                    return invalid(format!(
                        "procedure {} has unknown follow-up {}",
                        procedure.id, follow_up.procedure_id
                    ));
                }
            }
        }

        Ok(())
    }
}
