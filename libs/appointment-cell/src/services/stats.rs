// libs/appointment-cell/src/services/stats.rs
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Booking, BookingStatus};

/// Dashboard counters over a set of bookings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentStats {
    pub total: usize,
    pub today: usize,
    pub this_week: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl AppointmentStats {
    /// `total`, `today` and `this_week` count confirmed bookings only. The
    /// week runs Monday through Sunday around `today`.
    pub fn compute<'a>(bookings: impl IntoIterator<Item = &'a Booking>, today: NaiveDate) -> Self {
        let week_start = today
            .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
            .unwrap_or(today);
        let week_end = week_start.checked_add_days(Days::new(6)).unwrap_or(today);

        let mut stats = Self::default();
        for booking in bookings {
            match booking.status {
                BookingStatus::Confirmed => {
                    stats.total += 1;
                    if booking.date == today {
                        stats.today += 1;
                    }
                    if (week_start..=week_end).contains(&booking.date) {
                        stats.this_week += 1;
                    }
                }
                BookingStatus::Completed => stats.completed += 1,
                BookingStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }
}
