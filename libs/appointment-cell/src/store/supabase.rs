use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use schedule_cell::models::BookedSlot;
use schedule_cell::store::BookingLookup;
use schedule_cell::ClockTime;
use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{Appointment, AppointmentFilter, AppointmentStatus};
use super::AppointmentStore;

/// Appointments backed by the `appointments` table. The partial unique index
/// on `(doctor_id, appointment_date, start_time) where status <> 'cancelled'`
/// rejects a double booking with HTTP 409.
pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[derive(Deserialize)]
struct BookedRow {
    appointment_date: NaiveDate,
    start_time: ClockTime,
}

fn search_path(filter: &AppointmentFilter) -> String {
    let mut query_parts = Vec::new();

    if let Some(doctor_id) = &filter.doctor_id {
        query_parts.push(format!("doctor_id=eq.{}", urlencoding::encode(doctor_id)));
    }
    if let Some(patient_id) = &filter.patient_id {
        query_parts.push(format!("patient_id=eq.{}", urlencoding::encode(patient_id)));
    }
    if let Some(start_date) = filter.start_date {
        query_parts.push(format!("appointment_date=gte.{}", start_date));
    }
    if let Some(end_date) = filter.end_date {
        query_parts.push(format!("appointment_date=lte.{}", end_date));
    }
    if let Some(status) = filter.status {
        query_parts.push(format!("status=eq.{}", status));
    }
    query_parts.push("order=appointment_date.asc,start_time.asc".to_string());

    format!("/rest/v1/appointments?{}", query_parts.join("&"))
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, DatabaseError> {
        debug!(
            "Inserting appointment for doctor {} on {} at {}",
            appointment.doctor_id, appointment.appointment_date, appointment.start_time
        );

        let result: Vec<Appointment> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            Some(json!(appointment)),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        result.into_iter().next()
            .ok_or_else(|| DatabaseError::NotFound("Failed to create appointment".to_string()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let result: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(result.into_iter().next())
    }

    async fn search(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, DatabaseError> {
        debug!("Searching appointments with filters: {:?}", filter);
        self.supabase.request(Method::GET, &search_path(filter), None).await
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        notes: Option<String>,
    ) -> Result<Appointment, DatabaseError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&status=eq.{}", id, expected);

        let mut body = json!({
            "status": next,
            "updated_at": Utc::now(),
        });
        if let Some(notes) = notes {
            body["notes"] = json!(notes);
        }

        let result: Vec<Appointment> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        if let Some(updated) = result.into_iter().next() {
            return Ok(updated);
        }

        // Nothing matched: tell a missing row apart from a lost race.
        match self.get(id).await? {
            Some(current) => {
                warn!("Stale status write on appointment {}: now {}", id, current.status);
                Err(DatabaseError::Conflict(format!(
                    "Appointment {} is {}, expected {}",
                    id, current.status, expected
                )))
            }
            None => Err(DatabaseError::NotFound(format!("Appointment {} not found", id))),
        }
    }
}

#[async_trait]
impl BookingLookup for SupabaseAppointmentStore {
    async fn booked_slots(
        &self,
        doctor_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BookedSlot>, DatabaseError> {
        let path = format!(
            "/rest/v1/appointments?select=appointment_date,start_time&doctor_id=eq.{}&appointment_date=gte.{}&appointment_date=lte.{}&status=neq.cancelled",
            urlencoding::encode(doctor_id),
            start,
            end
        );

        let rows: Vec<BookedRow> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows
            .into_iter()
            .map(|row| BookedSlot { date: row.appointment_date, start_time: row.start_time })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_path_encodes_filters() {
        let filter = AppointmentFilter {
            doctor_id: Some("doc 1".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            status: Some(AppointmentStatus::Confirmed),
            ..Default::default()
        };

        assert_eq!(
            search_path(&filter),
            "/rest/v1/appointments?doctor_id=eq.doc%201&appointment_date=gte.2024-06-01&status=eq.confirmed&order=appointment_date.asc,start_time.asc"
        );
    }

    #[test]
    fn test_empty_filter_only_orders() {
        assert_eq!(
            search_path(&AppointmentFilter::default()),
            "/rest/v1/appointments?order=appointment_date.asc,start_time.asc"
        );
    }
}
