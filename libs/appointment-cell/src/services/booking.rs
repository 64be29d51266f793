// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use schedule_cell::services::AvailabilityResolver;
use schedule_cell::store::SpecialtyStore;
use shared_models::auth::User;
use shared_utils::policy::{can_perform, Action, Resource};

use crate::models::{
    Appointment, AppointmentError, AppointmentFilter, AppointmentSearchQuery, AppointmentStatus,
    CancelAppointmentRequest, CreateAppointmentRequest,
};
use crate::services::lifecycle::validate_status_transition;
use crate::store::AppointmentStore;

pub struct AppointmentBookingService {
    appointments: Arc<dyn AppointmentStore>,
    specialties: Arc<dyn SpecialtyStore>,
    resolver: AvailabilityResolver,
}

impl AppointmentBookingService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        specialties: Arc<dyn SpecialtyStore>,
        resolver: AvailabilityResolver,
    ) -> Self {
        Self { appointments, specialties, resolver }
    }

    /// Books a slot. The resolver check gives a fast, friendly rejection; the
    /// store's unique insert is what actually settles concurrent bookings.
    pub async fn book_appointment(
        &self,
        user: &User,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        if !can_perform(user, Action::CreateAppointment, Resource::NewAppointment) {
            return Err(AppointmentError::Unauthorized("cannot create appointments".to_string()));
        }

        debug!(
            "Booking appointment with doctor {} on {} at {}",
            request.doctor_id, request.appointment_date, request.start_time
        );
        self.validate_booking_request(&request).await?;

        let slot_free = self.resolver
            .is_slot_free(&request.doctor_id, request.appointment_date, request.start_time)
            .await?;
        if !slot_free {
            return Err(AppointmentError::slot_not_available());
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: request.doctor_id,
            patient_id: request.patient_id.unwrap_or_else(|| user.id.clone()),
            specialty_id: request.specialty_id,
            appointment_date: request.appointment_date,
            start_time: request.start_time,
            end_time: request.end_time,
            status: AppointmentStatus::Scheduled,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        let booked = self.appointments.insert(appointment).await.map_err(|e| {
            if e.is_conflict() {
                warn!("Lost booking race: {}", e);
                AppointmentError::slot_not_available()
            } else {
                e.into()
            }
        })?;

        info!(
            "Appointment {} booked for doctor {} on {} at {}",
            booked.id, booked.doctor_id, booked.appointment_date, booked.start_time
        );
        Ok(booked)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self.appointments.get(appointment_id).await?)
    }

    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let filter = AppointmentFilter::try_from(query)?;
        Ok(self.appointments.search(&filter).await?)
    }

    /// Confirm, complete or cancel. `status` is the raw requested value.
    pub async fn update_status(
        &self,
        user: &User,
        appointment_id: Uuid,
        status: &str,
    ) -> Result<Appointment, AppointmentError> {
        let new_status: AppointmentStatus = status.parse()?;
        let current = self.require(appointment_id).await?;

        let action = if new_status == AppointmentStatus::Cancelled {
            Action::CancelAppointment
        } else {
            Action::ChangeAppointmentStatus
        };
        authorize(user, action, &current)?;

        validate_status_transition(current.status, new_status)?;

        let updated = self.write_transition(&current, new_status, None).await?;
        info!("Appointment {} moved from {} to {}", appointment_id, current.status, new_status);
        Ok(updated)
    }

    /// Cancels and appends the reason to the notes. The slot is free again as
    /// soon as this returns.
    pub async fn cancel_appointment(
        &self,
        user: &User,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let current = self.require(appointment_id).await?;
        authorize(user, Action::CancelAppointment, &current)?;
        validate_status_transition(current.status, AppointmentStatus::Cancelled)?;

        let notes = cancellation_notes(current.notes.as_deref(), request.reason.as_deref());
        let cancelled = self
            .write_transition(&current, AppointmentStatus::Cancelled, Some(notes))
            .await?;

        info!("Appointment {} cancelled successfully", appointment_id);
        Ok(cancelled)
    }

    async fn require(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments.get(appointment_id).await?
            .ok_or_else(|| AppointmentError::NotFound(format!("Appointment {} not found", appointment_id)))
    }

    async fn write_transition(
        &self,
        current: &Appointment,
        next: AppointmentStatus,
        notes: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        self.appointments
            .transition(current.id, current.status, next, notes)
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    AppointmentError::Conflict(format!(
                        "Appointment {} was modified concurrently, reload and retry",
                        current.id
                    ))
                } else {
                    e.into()
                }
            })
    }

    async fn validate_booking_request(&self, request: &CreateAppointmentRequest) -> Result<(), AppointmentError> {
        if request.doctor_id.trim().is_empty() {
            return Err(AppointmentError::Validation("doctor_id is required".to_string()));
        }
        if matches!(&request.patient_id, Some(patient_id) if patient_id.trim().is_empty()) {
            return Err(AppointmentError::Validation("patient_id cannot be blank".to_string()));
        }
        if request.start_time >= request.end_time {
            return Err(AppointmentError::Validation(format!(
                "Appointment must start before it ends ({} - {})",
                request.start_time, request.end_time
            )));
        }

        if self.specialties.get(request.specialty_id).await?.is_none() {
            return Err(AppointmentError::NotFound(format!(
                "Specialty {} not found",
                request.specialty_id
            )));
        }

        Ok(())
    }
}

fn authorize(user: &User, action: Action, appointment: &Appointment) -> Result<(), AppointmentError> {
    let resource = Resource::Appointment {
        doctor_id: &appointment.doctor_id,
        patient_id: &appointment.patient_id,
    };

    if can_perform(user, action, resource) {
        Ok(())
    } else {
        Err(AppointmentError::Unauthorized(
            "you can only modify appointments you take part in".to_string(),
        ))
    }
}

fn cancellation_notes(existing: Option<&str>, reason: Option<&str>) -> String {
    let line = match reason.map(str::trim).filter(|reason| !reason.is_empty()) {
        Some(reason) => format!("Cancelled: {}", reason),
        None => "Cancelled".to_string(),
    };

    match existing.filter(|notes| !notes.trim().is_empty()) {
        Some(notes) => format!("{}\n{}", notes, line),
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_notes() {
        assert_eq!(cancellation_notes(None, None), "Cancelled");
        assert_eq!(cancellation_notes(None, Some("  ")), "Cancelled");
        assert_eq!(cancellation_notes(None, Some("sick")), "Cancelled: sick");
        assert_eq!(
            cancellation_notes(Some("Bring results"), Some("sick")),
            "Bring results\nCancelled: sick"
        );
    }
}
