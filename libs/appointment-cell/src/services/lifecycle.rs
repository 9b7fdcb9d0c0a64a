// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, info, warn};

use crate::models::{AppointmentError, Booking, BookingStatus};

#[derive(Debug, Clone, Copy, Default)]
pub struct BookingLifecycle;

impl BookingLifecycle {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: BookingStatus,
        new_status: BookingStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }
        Ok(())
    }

    pub fn valid_transitions(&self, current_status: BookingStatus) -> Vec<BookingStatus> {
        match current_status {
            BookingStatus::Confirmed => vec![BookingStatus::Completed, BookingStatus::Cancelled],
            // Terminal states
            BookingStatus::Completed | BookingStatus::Cancelled => vec![],
        }
    }

    /// Cancelling frees the booking's room and doctors for later searches.
    pub fn cancel(&self, booking: &mut Booking) -> Result<(), AppointmentError> {
        self.transition(booking, BookingStatus::Cancelled)
    }

    /// A completed booking still counts as occupying its interval.
    pub fn complete(&self, booking: &mut Booking) -> Result<(), AppointmentError> {
        self.transition(booking, BookingStatus::Completed)
    }

    fn transition(&self, booking: &mut Booking, new_status: BookingStatus) -> Result<(), AppointmentError> {
        self.validate_status_transition(booking.status, new_status)?;
        info!("Booking {} moved {} -> {}", booking.id, booking.status, new_status);
        booking.status = new_status;
        Ok(())
    }
}
