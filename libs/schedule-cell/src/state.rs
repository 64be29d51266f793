use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::{AvailabilityResolver, ScheduleService, SpecialtyService};
use crate::store::{BookingLookup, ScheduleStore, SpecialtyStore};

/// Stores shared by every schedule-cell route. Services are built per request
/// on top of these handles.
#[derive(Clone)]
pub struct ScheduleCellState {
    pub config: Arc<AppConfig>,
    pub specialties: Arc<dyn SpecialtyStore>,
    pub schedules: Arc<dyn ScheduleStore>,
    pub bookings: Arc<dyn BookingLookup>,
}

impl ScheduleCellState {
    pub fn specialty_service(&self) -> SpecialtyService {
        SpecialtyService::new(self.specialties.clone())
    }

    pub fn schedule_service(&self) -> ScheduleService {
        ScheduleService::new(self.schedules.clone(), self.specialties.clone())
    }

    pub fn resolver(&self) -> AvailabilityResolver {
        AvailabilityResolver::new(self.schedules.clone(), self.bookings.clone())
    }
}
