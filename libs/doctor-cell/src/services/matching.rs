// libs/doctor-cell/src/services/matching.rs
use tracing::debug;

use crate::models::{Doctor, DoctorPair};

/// Selects doctor pools for a procedure, preserving catalog order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoctorMatchingService;

impl DoctorMatchingService {
    pub fn new() -> Self {
        Self
    }

    /// Every doctor holding `specialization`, in catalog order.
    pub fn doctors_with_specialization<'a>(
        &self,
        doctors: &'a [Doctor],
        specialization: &str,
    ) -> Vec<&'a Doctor> {
        doctors
            .iter()
            .filter(|doctor| doctor.has_specialization(specialization))
            .collect()
    }

    /// Primary-role doctors (outer) crossed with secondary-role doctors
    /// (inner), both in catalog order. A doctor never pairs with themself.
    pub fn practitioner_pairs<'a>(
        &self,
        doctors: &'a [Doctor],
        primary_specialization: &str,
        secondary_specialization: &str,
    ) -> Vec<DoctorPair<'a>> {
        let primaries = self.doctors_with_specialization(doctors, primary_specialization);
        let secondaries = self.doctors_with_specialization(doctors, secondary_specialization);

        let mut pairs = Vec::with_capacity(primaries.len() * secondaries.len());
        for &primary in &primaries {
            for &secondary in &secondaries {
                if secondary.id != primary.id {
                    pairs.push(DoctorPair { primary, secondary });
                }
            }
        }

        debug!(
            "Matched {} {} x {} pairs",
            pairs.len(),
            primary_specialization,
            secondary_specialization
        );
        pairs
    }
}
