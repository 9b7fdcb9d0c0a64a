pub mod availability;
pub mod matching;

pub use availability::AvailabilityService;
pub use matching::DoctorMatchingService;
