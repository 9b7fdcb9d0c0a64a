// libs/shared/utils/src/time_grid.rs
//
// Minute-of-day clock arithmetic shared by availability, conflict and search.
// All times are local wall-clock at minute resolution.

use chrono::{Datelike, NaiveDate, Weekday};

use shared_models::AppError;

/// Granularity of every candidate start time.
pub const SLOT_QUANTUM_MINUTES: u32 = 15;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Catalog weekday for each `chrono` weekday, indexed Monday=0..Sunday=6.
/// The catalog numbers days Sunday=0..Saturday=6.
const MONDAY_FIRST_TO_CATALOG: [u8; 7] = [1, 2, 3, 4, 5, 6, 0];

/// Parse a 24-hour `HH:MM` clock string into minutes since midnight.
pub fn time_to_minutes(text: &str) -> Result<u32, AppError> {
    let malformed = || AppError::FormatError(format!("expected HH:MM, got '{}'", text));

    let (hours, minutes) = text.split_once(':').ok_or_else(malformed)?;
    if hours.is_empty()
        || hours.len() > 2
        || minutes.len() != 2
        || !hours.bytes().all(|b| b.is_ascii_digit())
        || !minutes.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(malformed());
    }

    let hours: u32 = hours.parse().map_err(|_| malformed())?;
    let minutes: u32 = minutes.parse().map_err(|_| malformed())?;
    if hours > 23 || minutes > 59 {
        return Err(malformed());
    }

    Ok(hours * 60 + minutes)
}

/// Zero-padded `HH:MM` for a minute-of-day.
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Number of 15-minute quanta a procedure of `duration_minutes` occupies.
pub fn quanta_needed(duration_minutes: u32) -> u32 {
    duration_minutes.div_ceil(SLOT_QUANTUM_MINUTES)
}

/// Translate a platform weekday into the catalog's Sunday-first numbering.
pub fn catalog_weekday(weekday: Weekday) -> u8 {
    MONDAY_FIRST_TO_CATALOG[weekday.num_days_from_monday() as usize]
}

pub fn catalog_weekday_of(date: NaiveDate) -> u8 {
    catalog_weekday(date.weekday())
}

/// Serde adapter storing a minute-of-day as an `HH:MM` string.
pub mod hhmm {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(minutes: &u32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::minutes_to_time(*minutes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::time_to_minutes(&raw).map_err(D::Error::custom)
    }
}
