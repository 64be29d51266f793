pub mod availability;
pub mod schedule;
pub mod specialty;

pub use availability::AvailabilityResolver;
pub use schedule::ScheduleService;
pub use specialty::SpecialtyService;
