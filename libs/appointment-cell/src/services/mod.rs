pub mod booking;
pub mod bulk;
pub mod conflict;
pub mod lifecycle;
pub mod proposal;
pub mod slot_search;
pub mod stats;

pub use booking::BookingService;
pub use bulk::BulkConflictValidator;
pub use conflict::{ConflictDetectionService, ConflictQuery};
pub use lifecycle::BookingLifecycle;
pub use proposal::ProposalParser;
pub use slot_search::SlotSearchService;
pub use stats::AppointmentStats;
