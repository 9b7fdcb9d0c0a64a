// libs/doctor-cell/src/services/availability.rs
use tracing::debug;

use shared_utils::time_grid::SLOT_QUANTUM_MINUTES;

use crate::models::{AvailabilitySet, Doctor, DoctorPair};

/// Resolves recurring weekly schedules into quantized start-minutes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvailabilityService;

impl AvailabilityService {
    pub fn new() -> Self {
        Self
    }

    /// Start-minutes (step 15) at which `doctor` is on duty at `clinic_id` on
    /// `weekday` (Sunday=0). Each start leaves room for one full quantum
    /// before the window closes. Empty when no window matches.
    pub fn doctor_slots(&self, doctor: &Doctor, clinic_id: &str, weekday: u8) -> AvailabilitySet {
        let Some(window) = doctor.window_for(clinic_id, weekday) else {
            debug!(
                "Doctor {} has no window at {} on weekday {}",
                doctor.id, clinic_id, weekday
            );
            return AvailabilitySet::new();
        };

        let last_start = window.end_minute() - SLOT_QUANTUM_MINUTES;
        (window.start_minute()..=last_start)
            .step_by(SLOT_QUANTUM_MINUTES as usize)
            .collect()
    }

    /// Start-minutes at which both practitioners of `pair` are on duty.
    pub fn joint_slots(&self, pair: &DoctorPair<'_>, clinic_id: &str, weekday: u8) -> AvailabilitySet {
        let primary = self.doctor_slots(pair.primary, clinic_id, weekday);
        if primary.is_empty() {
            return primary;
        }
        let secondary = self.doctor_slots(pair.secondary, clinic_id, weekday);
        primary.intersection(&secondary).copied().collect()
    }

    /// Starts in `slots`, ascending, from which `quanta` consecutive
    /// quanta all lie inside `slots`.
    pub fn contiguous_starts<'a>(
        &self,
        slots: &'a AvailabilitySet,
        quanta: u32,
    ) -> impl Iterator<Item = u32> + 'a {
        slots.iter().copied().filter(move |start| {
            (0..quanta).all(|i| slots.contains(&(start + i * SLOT_QUANTUM_MINUTES)))
        })
    }

    pub fn earliest_contiguous_start(&self, slots: &AvailabilitySet, quanta: u32) -> Option<u32> {
        self.contiguous_starts(slots, quanta).next()
    }
}
