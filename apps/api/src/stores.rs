use std::sync::Arc;

use tracing::info;

use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
use appointment_cell::AppointmentCellState;
use schedule_cell::store::{
    BookingLookup, InMemoryScheduleStore, InMemorySpecialtyStore, ScheduleStore, SpecialtyStore,
    SupabaseScheduleStore, SupabaseSpecialtyStore,
};
use schedule_cell::ScheduleCellState;
use shared_config::{AppConfig, StoreBackend};
use shared_database::SupabaseClient;

/// One handle per store, shared by both cells.
#[derive(Clone)]
pub struct Stores {
    pub specialties: Arc<dyn SpecialtyStore>,
    pub schedules: Arc<dyn ScheduleStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub bookings: Arc<dyn BookingLookup>,
}

impl Stores {
    pub fn from_config(config: &AppConfig) -> Self {
        match config.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory stores");
                Self::in_memory()
            }
            StoreBackend::Supabase => {
                info!("Using Supabase stores at {}", config.supabase_url);
                let supabase = Arc::new(SupabaseClient::new(config));
                let appointments = Arc::new(SupabaseAppointmentStore::new(supabase.clone()));

                Self {
                    specialties: Arc::new(SupabaseSpecialtyStore::new(supabase.clone())),
                    schedules: Arc::new(SupabaseScheduleStore::new(supabase)),
                    appointments: appointments.clone(),
                    bookings: appointments,
                }
            }
        }
    }

    pub fn in_memory() -> Self {
        let appointments = Arc::new(InMemoryAppointmentStore::new());

        Self {
            specialties: Arc::new(InMemorySpecialtyStore::new()),
            schedules: Arc::new(InMemoryScheduleStore::new()),
            appointments: appointments.clone(),
            bookings: appointments,
        }
    }

    pub fn schedule_state(&self, config: Arc<AppConfig>) -> ScheduleCellState {
        ScheduleCellState {
            config,
            specialties: self.specialties.clone(),
            schedules: self.schedules.clone(),
            bookings: self.bookings.clone(),
        }
    }

    pub fn appointment_state(&self, config: Arc<AppConfig>) -> AppointmentCellState {
        AppointmentCellState {
            config,
            appointments: self.appointments.clone(),
            bookings: self.bookings.clone(),
            schedules: self.schedules.clone(),
            specialties: self.specialties.clone(),
        }
    }
}
