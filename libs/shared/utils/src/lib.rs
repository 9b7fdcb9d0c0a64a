pub mod time_grid;

pub use time_grid::{
    catalog_weekday, catalog_weekday_of, minutes_to_time, quanta_needed, time_to_minutes, MINUTES_PER_DAY,
    SLOT_QUANTUM_MINUTES,
};
