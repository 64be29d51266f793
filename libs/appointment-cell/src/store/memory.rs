use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use schedule_cell::models::BookedSlot;
use schedule_cell::store::BookingLookup;
use shared_database::DatabaseError;

use crate::models::{Appointment, AppointmentFilter, AppointmentStatus};
use super::AppointmentStore;

/// Process-local ledger. The live-slot check and the insert happen under a
/// single write lock, so two racing bookings for one slot cannot both land.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, DatabaseError> {
        let mut appointments = self.appointments.write().await;

        if appointment.is_live()
            && appointments.iter().any(|existing| {
                existing.occupies(&appointment.doctor_id, appointment.appointment_date, appointment.start_time)
            })
        {
            return Err(DatabaseError::Conflict(format!(
                "Doctor {} is already booked on {} at {}",
                appointment.doctor_id, appointment.appointment_date, appointment.start_time
            )));
        }

        appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        let appointments = self.appointments.read().await;
        Ok(appointments.iter().find(|appointment| appointment.id == id).cloned())
    }

    async fn search(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, DatabaseError> {
        let appointments = self.appointments.read().await;
        let mut found: Vec<Appointment> = appointments
            .iter()
            .filter(|appointment| filter.matches(appointment))
            .cloned()
            .collect();

        found.sort_by_key(|appointment| (appointment.appointment_date, appointment.start_time));
        Ok(found)
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        notes: Option<String>,
    ) -> Result<Appointment, DatabaseError> {
        let mut appointments = self.appointments.write().await;

        let stored = appointments
            .iter_mut()
            .find(|appointment| appointment.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Appointment {} not found", id)))?;

        if stored.status != expected {
            return Err(DatabaseError::Conflict(format!(
                "Appointment {} is {}, expected {}",
                id, stored.status, expected
            )));
        }

        stored.status = next;
        if notes.is_some() {
            stored.notes = notes;
        }
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }
}

#[async_trait]
impl BookingLookup for InMemoryAppointmentStore {
    async fn booked_slots(
        &self,
        doctor_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BookedSlot>, DatabaseError> {
        let appointments = self.appointments.read().await;
        Ok(appointments
            .iter()
            .filter(|appointment| {
                appointment.is_live()
                    && appointment.doctor_id == doctor_id
                    && appointment.appointment_date >= start
                    && appointment.appointment_date <= end
            })
            .map(|appointment| BookedSlot {
                date: appointment.appointment_date,
                start_time: appointment.start_time,
            })
            .collect())
    }
}
