use std::sync::Arc;

use schedule_cell::services::AvailabilityResolver;
use schedule_cell::store::{BookingLookup, ScheduleStore, SpecialtyStore};
use shared_config::AppConfig;

use crate::services::booking::AppointmentBookingService;
use crate::store::AppointmentStore;

/// `appointments` and `bookings` are normally the same store seen through its
/// two traits.
#[derive(Clone)]
pub struct AppointmentCellState {
    pub config: Arc<AppConfig>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub bookings: Arc<dyn BookingLookup>,
    pub schedules: Arc<dyn ScheduleStore>,
    pub specialties: Arc<dyn SpecialtyStore>,
}

impl AppointmentCellState {
    pub fn booking_service(&self) -> AppointmentBookingService {
        AppointmentBookingService::new(
            self.appointments.clone(),
            self.specialties.clone(),
            AvailabilityResolver::new(self.schedules.clone(), self.bookings.clone()),
        )
    }
}
